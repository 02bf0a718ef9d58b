use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{models::PlayerLiveStats, service::StatsService, types::StatUpdateResponse};
use crate::auth::AuthenticatedUser;
use crate::shared::{AppError, AppState};

/// HTTP handler for live stat ingestion
///
/// PUT /admin/matches/:match_id/players/:player_id/stats
/// Takes the full stats block and returns the recomputed total
#[instrument(name = "update_player_stats", skip(state, admin, stats), fields(admin = %admin.user_id))]
pub async fn update_player_stats(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path((match_id, player_id)): Path<(String, String)>,
    Json(stats): Json<PlayerLiveStats>,
) -> Result<Json<StatUpdateResponse>, AppError> {
    let service = StatsService::new(Arc::clone(&state.squad_repository));
    let response = service
        .update_player_stats(&match_id, &player_id, stats)
        .await?;

    Ok(Json(response))
}
