use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::{oauth::OAuthError, soft_delete::EntityKind};

/// RepoError
///
/// Failures surfaced by every `Repository` implementation. Handlers never see raw
/// `sqlx::Error`s other than through the `Database` variant.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    // A lookup that must yield one row yielded several.
    #[error("more than one {kind} matched {id}")]
    MultipleReturned { kind: EntityKind, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        RepoError::NotFound { kind, id }
    }

    /// Maps Postgres constraint violations onto the variants the API reports as client errors.
    pub fn from_db(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => return RepoError::Conflict(db_err.message().to_string()),
                // foreign_key_violation
                Some("23503") => return RepoError::Validation(db_err.message().to_string()),
                _ => {}
            }
        }
        RepoError::Database(err)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// ErrorBody
///
/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}

/// ApiError
///
/// The error type returned by handlers. Each variant maps onto one status code;
/// `Internal` never leaks its message to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication credentials were not provided or are invalid.")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("You do not have permission to perform this action.".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "request failed with an internal error");
                "Internal server error.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepoError::Validation(message) => ApiError::Validation(message),
            RepoError::Conflict(message) => ApiError::Conflict(message),
            RepoError::MultipleReturned { .. } | RepoError::Database(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, field_errors)| {
                let codes: Vec<String> = field_errors
                    .iter()
                    .map(|error| {
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| error.code.to_string())
                    })
                    .collect();
                format!("{}: {}", field, codes.join(", "))
            })
            .collect();
        fields.sort();
        ApiError::Validation(fields.join("; "))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<OAuthError> for ApiError {
    // Every failure of the social login flow is reported to the client as a bad request.
    fn from(err: OAuthError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
