//! Error types of the account subsystem and their HTTP rendering

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::DatabaseError;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

use crate::{email::EmailError, oauth::OAuthError, password::PasswordError};

/// Failure while writing the queued changes of a unit of work
///
/// The transaction has already been rolled back when this is returned.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("An item couldn't be added: {0}")]
    Add(#[source] sqlx::Error),

    #[error("An item couldn't be removed: {0}")]
    Remove(#[source] sqlx::Error),

    #[error("Session couldn't be flushed: {0}")]
    Flush(#[source] sqlx::Error),

    #[error("Session couldn't be committed: {0}")]
    Commit(#[source] sqlx::Error),
}

/// Business rule violations and collaborator failures raised by services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Email already used")]
    EmailAlreadyUsed,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("User account not activated")]
    UserAccountNotActivated,

    #[error("User account not found")]
    UserAccountNotFound,

    #[error("Not found reset token")]
    InvalidResetToken,

    #[error("Invalid token")]
    InvalidActivationToken,

    /// Field name to message
    #[error("Incorrect input")]
    IncorrectInput(BTreeMap<String, String>),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    UnitOfWork(#[from] DbError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),
}

impl ServiceError {
    /// Single-field input error
    pub fn incorrect_input(field: &str, message: &str) -> Self {
        ServiceError::IncorrectInput(BTreeMap::from([(field.to_string(), message.to_string())]))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::EmailAlreadyUsed => StatusCode::CONFLICT,
            ServiceError::IncorrectPassword
            | ServiceError::InvalidResetToken
            | ServiceError::InvalidActivationToken => StatusCode::BAD_REQUEST,
            ServiceError::UserAccountNotActivated => StatusCode::FORBIDDEN,
            ServiceError::UserAccountNotFound => StatusCode::UNAUTHORIZED,
            ServiceError::IncorrectInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Database(DatabaseError::NoEntityFound(_)) => StatusCode::NOT_FOUND,
            ServiceError::OAuth(OAuthError::Exchange(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = match self {
            ServiceError::IncorrectInput(fields) => serde_json::json!({
                "error": "Incorrect input",
                "fields": fields,
            }),
            _ if status.is_server_error() => serde_json::json!({ "error": "Internal server error" }),
            other => serde_json::json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Errors of the HTTP layer that do not come from a service
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unknown OAuth provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid OAuth state")]
    InvalidOAuthState,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<DatabaseError> for AuthError {
    fn from(error: DatabaseError) -> Self {
        AuthError::Service(error.into())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::Service(error) => return error.into_response(),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::UnknownProvider(provider) => (
                StatusCode::NOT_FOUND,
                format!("Unknown OAuth provider: {}", provider),
            ),
            AuthError::InvalidOAuthState => {
                (StatusCode::BAD_REQUEST, "Invalid OAuth state".to_string())
            }
            AuthError::Internal(e) => {
                error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
