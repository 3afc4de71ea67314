//! Request failure mapping.
//!
//! # Responsibilities
//! - Map every dispatch failure to a status code and a plain text body
//! - Keep absolute filesystem paths out of 4xx bodies

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::render::RenderError;

/// Failure while answering a preview request.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PreviewError {
    pub fn status(&self) -> StatusCode {
        match self {
            PreviewError::NotFound(_) => StatusCode::NOT_FOUND,
            PreviewError::Forbidden => StatusCode::FORBIDDEN,
            PreviewError::Render(_) | PreviewError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PreviewError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status.is_server_error() {
            format!("Server error: {self}")
        } else {
            self.to_string()
        };
        (status, body).into_response()
    }
}
