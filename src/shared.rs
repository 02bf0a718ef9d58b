use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::TokenConfig;
use crate::contest::repository::ContestRepository;
use crate::directory::repository::DirectoryRepository;
use crate::roster::RosterValidationError;
use crate::squad::repository::SquadRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub contest_repository: Arc<dyn ContestRepository + Send + Sync>,
    pub squad_repository: Arc<dyn SquadRepository + Send + Sync>,
    pub directory: Arc<dyn DirectoryRepository + Send + Sync>,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(
        contest_repository: Arc<dyn ContestRepository + Send + Sync>,
        squad_repository: Arc<dyn SquadRepository + Send + Sync>,
        directory: Arc<dyn DirectoryRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            contest_repository,
            squad_repository,
            directory,
            token_config,
        }
    }
}

/// Closed error taxonomy shared by every component.
///
/// `Validation`, `ContestFull`, `ContestNotOpen` and `PerUserLimitExceeded` are
/// expected, user-facing rejections. `InvalidState` and `DatabaseError` are
/// operational failures the caller may retry.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Roster rejected: {0}")]
    Validation(#[from] RosterValidationError),

    #[error("Contest is full")]
    ContestFull,

    #[error("Contest is not open for entries")]
    ContestNotOpen,

    #[error("Per-user entry limit reached for this contest")]
    PerUserLimitExceeded,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Stable machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(err) => err.code(),
            AppError::ContestFull => "CONTEST_FULL",
            AppError::ContestNotOpen => "CONTEST_NOT_OPEN",
            AppError::PerUserLimitExceeded => "PER_USER_LIMIT_EXCEEDED",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::DatabaseError(_) => "STORE_UNAVAILABLE",
            AppError::JwtError(_) => "INVALID_TOKEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Internal => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ContestFull
            | AppError::ContestNotOpen
            | AppError::PerUserLimitExceeded
            | AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::JwtError(_) | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
