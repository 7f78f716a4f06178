//! HTTP mapping for domain errors
//!
//! Every failure surfaces as a typed status code with a JSON body; nothing
//! is swallowed into a fake redirect-as-success.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hourglass_common::Error;
use serde_json::json;
use tracing::error;

/// Wrapper giving `hourglass_common::Error` an HTTP representation
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::TimerNotRunning => StatusCode::CONFLICT,
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let body = Json(json!({
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}
