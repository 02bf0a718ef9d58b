use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::contest;
use crate::scoring;
use crate::shared::AppState;
use crate::squad;

/// Builds the full HTTP surface over the given state
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/matches/:match_id/squad", get(squad::get_squad))
        .route(
            "/matches/:match_id/contests",
            get(contest::list_contests_for_match),
        )
        .route("/contests/:contest_id", get(contest::get_contest))
        .route(
            "/contests/:contest_id/leaderboard",
            get(contest::get_leaderboard),
        );

    let user = Router::new()
        .route("/contests/:contest_id/join", post(contest::join_contest))
        .route("/me/rosters", get(contest::list_my_rosters))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    let admin = Router::new()
        .route(
            "/admin/matches/:match_id/squad/assign",
            post(squad::assign_squad),
        )
        .route("/admin/matches/:match_id/squad", put(squad::replace_squad))
        .route(
            "/admin/matches/:match_id/players/:player_id/stats",
            put(scoring::update_player_stats),
        )
        .route("/admin/contests", post(contest::create_contest))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .merge(public)
        .merge(user)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
