use actix_web::{ResponseError, http::StatusCode};

use crate::error::common::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum PasswordResetError {
    #[error("{0}")]
    ValidationError(String),
    #[error("El enlace de recuperación no es válido o ha caducado.")]
    InvalidToken(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for PasswordResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for PasswordResetError {
    fn status_code(&self) -> StatusCode {
        match self {
            PasswordResetError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PasswordResetError::InvalidToken(_) => StatusCode::BAD_REQUEST,
            PasswordResetError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
