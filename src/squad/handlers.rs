use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    assigner::{AssignmentOutcome, SquadAssigner},
    models::MatchSquad,
    service::SquadService,
    types::ReplaceSquadRequest,
};
use crate::auth::AuthenticatedUser;
use crate::shared::{AppError, AppState};

/// HTTP handler for reading a match squad
///
/// GET /matches/:match_id/squad
/// Returns 404 until a squad has been assigned
#[instrument(name = "get_squad", skip(state))]
pub async fn get_squad(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchSquad>, AppError> {
    let service = SquadService::new(
        Arc::clone(&state.squad_repository),
        Arc::clone(&state.directory),
    );

    service
        .get_squad(&match_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No squad assigned for match {}", match_id)))
}

/// HTTP handler for deriving a squad from team-roster associations
///
/// POST /admin/matches/:match_id/squad/assign
#[instrument(name = "assign_squad", skip(state, admin), fields(admin = %admin.user_id))]
pub async fn assign_squad(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(match_id): Path<String>,
) -> Result<Json<AssignmentOutcome>, AppError> {
    info!(match_id = %match_id, "Auto-assigning squad");

    let assigner = SquadAssigner::new(
        Arc::clone(&state.directory),
        Arc::clone(&state.squad_repository),
    );
    let outcome = assigner.assign(&match_id).await?;

    Ok(Json(outcome))
}

/// HTTP handler for a manual squad edit
///
/// PUT /admin/matches/:match_id/squad
#[instrument(name = "replace_squad", skip(state, admin, request), fields(admin = %admin.user_id))]
pub async fn replace_squad(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(match_id): Path<String>,
    Json(request): Json<ReplaceSquadRequest>,
) -> Result<Json<MatchSquad>, AppError> {
    let service = SquadService::new(
        Arc::clone(&state.squad_repository),
        Arc::clone(&state.directory),
    );
    let squad = service.replace_squad(&match_id, request).await?;

    Ok(Json(squad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::squad::models::test_support::squad_with;
    use crate::squad::repository::{InMemorySquadRepository, SquadRepository};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_get_squad_not_assigned() {
        let app_state = AppStateBuilder::new().build();
        let app = Router::new()
            .route("/matches/:match_id/squad", get(get_squad))
            .with_state(app_state);

        let request = Request::builder()
            .uri("/matches/m1/squad")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_squad_handler() {
        let squads = Arc::new(InMemorySquadRepository::new());
        squads.put_squad(&squad_with("m1", 7)).await.unwrap();
        let app_state = AppStateBuilder::new().with_squad_repository(squads).build();
        let app = Router::new()
            .route("/matches/:match_id/squad", get(get_squad))
            .with_state(app_state);

        let request = Request::builder()
            .uri("/matches/m1/squad")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let squad: MatchSquad = serde_json::from_slice(&body).unwrap();
        assert_eq!(squad.match_id, "m1");
        assert_eq!(squad.home.players.len(), 7);
    }
}
