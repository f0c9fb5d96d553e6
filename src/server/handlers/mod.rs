//! HTTP handlers for the server.

pub mod labels;
pub mod printer;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::error::LabelError;

/// HTTP status for a failed label operation.
pub fn status_for(err: &LabelError) -> StatusCode {
    match err {
        LabelError::Permission(_) => StatusCode::FORBIDDEN,
        LabelError::NotReady(_) => StatusCode::CONFLICT,
        LabelError::Connection(_) | LabelError::Transmission(_) => StatusCode::BAD_GATEWAY,
        LabelError::Upstream(_) => StatusCode::FAILED_DEPENDENCY,
        LabelError::InvalidJob(_) | LabelError::Config(_) => StatusCode::BAD_REQUEST,
        LabelError::Image(_) | LabelError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error body: `{"success": false, "error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<LabelError> for ApiError {
    fn from(err: LabelError) -> Self {
        Self {
            status: status_for(&err),
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task error: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, error = %self.message, "request failed");
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::status::NotReadyReason;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LabelError::Permission("x".into()), 403),
            (LabelError::NotReady(NotReadyReason::PaperOut), 409),
            (LabelError::Connection("x".into()), 502),
            (LabelError::Transmission("x".into()), 502),
            (LabelError::Upstream("x".into()), 424),
            (LabelError::InvalidJob("x".into()), 400),
            (LabelError::Config("x".into()), 400),
            (LabelError::Image("x".into()), 500),
        ];
        for (err, code) in cases {
            assert_eq!(status_for(&err).as_u16(), code, "{}", err);
        }
    }
}
