use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::html;

/// Crate-wide failure taxonomy. Handlers never recover locally; everything
/// propagates here and is rendered by the `IntoResponse` impl below.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("no user with id {0}")]
    NotFound(i64),
    #[error("upload write failed: {0}")]
    Upload(#[from] std::io::Error),
    #[error("database failure: {0}")]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upload(_) | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, %status, "request failed");
        (status, Html(html::error_page(&self.to_string()))).into_response()
    }
}
