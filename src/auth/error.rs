use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::validation::ValidationErrors;
use crate::users::StoreError;

pub const INCORRECT_CREDENTIALS: &str = "Username or password is not correct!";
pub const PASSWORD_REQUIRED: &str = "Please provide Your Password!";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(ValidationErrors),
    /// Unknown email and wrong password share this message.
    #[error("{}", INCORRECT_CREDENTIALS)]
    InvalidCredentials,
    #[error("{}", PASSWORD_REQUIRED)]
    PasswordRequired,
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Invalid or expired session")]
    InvalidSession,
    #[error("Provider not enabled")]
    ProviderDisabled,
    #[error("mail dispatch failed: {0}")]
    Mail(anyhow::Error),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::Database(e) => Self::Internal(e.into()),
        }
    }
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::InvalidCredentials | AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
            AuthError::PasswordRequired => StatusCode::BAD_REQUEST,
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::ProviderDisabled => StatusCode::NOT_FOUND,
            AuthError::Mail(_) => StatusCode::BAD_GATEWAY,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AuthError::Validation(errors) => (status, Json(errors)).into_response(),
            AuthError::Mail(e) => {
                error!(error = %e, "mail dispatch failed");
                (status, "Failed to send activation email".to_string()).into_response()
            }
            AuthError::Internal(e) => {
                error!(error = %e, "internal error");
                (status, "Internal server error".to_string()).into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
