//! Problem-details JSON responses for failed requests.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::ScrapeError;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// Malformed path or query parameters.
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Scrape(err) => match err {
                ScrapeError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                ScrapeError::NotFound(_) => StatusCode::NOT_FOUND,
                ScrapeError::Fetch { .. } | ScrapeError::Http(_) => StatusCode::BAD_GATEWAY,
                ScrapeError::MissingSection(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    title: String,
    status: u16,
    detail: String,
}

impl ErrorResponse {
    pub fn from_error(err: &ApiError) -> Self {
        let status = err.status_code();
        Self {
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status: status.as_u16(),
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(ErrorResponse::from_error(&self))).into_response()
    }
}
