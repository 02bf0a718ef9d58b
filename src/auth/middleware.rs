use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::types::{AuthenticatedUser, UserRole};
use crate::shared::{AppError, AppState};

/// Extracts and verifies the Bearer token from request headers
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            AppError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Invalid Authorization header format (expected Bearer token)");
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let claims = state.token_config.validate_token(token).map_err(|e| {
        warn!("JWT authentication failed: {}", e);
        e
    })?;

    Ok(claims.into())
}

/// Requires a verified user identity.
/// Usage: .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_user))
/// Handlers can then extract Extension(user): Extension<AuthenticatedUser>.
#[instrument(skip(state, req, next))]
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, req.headers())?;
    debug!(user_id = %user.user_id, uri = %req.uri(), "Request authenticated");

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Requires a verified identity carrying the admin role
#[instrument(skip(state, req, next))]
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, req.headers())?;

    if user.role != UserRole::Admin {
        warn!(user_id = %user.user_id, uri = %req.uri(), "Non-admin caller on admin route");
        return Err(AppError::Forbidden("Admin role required".to_string()));
    }

    debug!(user_id = %user.user_id, uri = %req.uri(), "Admin request authenticated");
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
