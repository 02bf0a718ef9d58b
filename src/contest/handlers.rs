use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::{Contest, MembershipReceipt},
    service::ContestRegistry,
    types::{CreateContestRequest, LeaderboardEntry},
};
use crate::auth::AuthenticatedUser;
use crate::roster::{RosterSubmission, UserRoster};
use crate::shared::{AppError, AppState};

fn registry(state: &AppState) -> ContestRegistry {
    ContestRegistry::new(
        Arc::clone(&state.contest_repository),
        Arc::clone(&state.squad_repository),
        Arc::clone(&state.directory),
    )
}

/// HTTP handler for joining a contest
///
/// POST /contests/:contest_id/join
/// The user id comes from the verified token, never from the body
#[instrument(name = "join_contest", skip(state, user, submission), fields(user_id = %user.user_id))]
pub async fn join_contest(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(contest_id): Path<String>,
    Json(submission): Json<RosterSubmission>,
) -> Result<Json<MembershipReceipt>, AppError> {
    let receipt = registry(&state)
        .join(&contest_id, &user.user_id, submission)
        .await?;

    Ok(Json(receipt))
}

/// GET /matches/:match_id/contests
#[instrument(name = "list_contests_for_match", skip(state))]
pub async fn list_contests_for_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<Vec<Contest>>, AppError> {
    let contests = registry(&state).list_contests_for_match(&match_id).await?;
    Ok(Json(contests))
}

/// GET /contests/:contest_id
#[instrument(name = "get_contest", skip(state))]
pub async fn get_contest(
    State(state): State<AppState>,
    Path(contest_id): Path<String>,
) -> Result<Json<Contest>, AppError> {
    let contest = registry(&state).get_contest(&contest_id).await?;
    Ok(Json(contest))
}

/// GET /contests/:contest_id/leaderboard
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(contest_id): Path<String>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let entries = registry(&state).leaderboard(&contest_id).await?;
    Ok(Json(entries))
}

/// GET /me/rosters
#[instrument(name = "list_my_rosters", skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_my_rosters(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<UserRoster>>, AppError> {
    let rosters = registry(&state).list_user_rosters(&user.user_id).await?;
    Ok(Json(rosters))
}

/// HTTP handler for creating a contest
///
/// POST /admin/contests
/// Returns 201 with the stored contest
#[instrument(name = "create_contest", skip(state, admin, request), fields(admin = %admin.user_id))]
pub async fn create_contest(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Json(request): Json<CreateContestRequest>,
) -> Result<(StatusCode, Json<Contest>), AppError> {
    let contest = registry(&state).create_contest(request).await?;
    Ok((StatusCode::CREATED, Json(contest)))
}
