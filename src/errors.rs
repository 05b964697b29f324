use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde_json::json;

use crate::store::StoreError;

/// Handler-level failure rendered as the fixed JSON error envelope:
/// `{"success": false, "error": <code>, "message": <message>}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a code, message and status code
    pub fn new<S: ToString>(code: &'static str, message: S, status_code: StatusCode) -> Self {
        Self {
            code,
            message: message.to_string(),
            status_code,
        }
    }

    /// Malformed JSON or request body (400)
    pub fn bad_request() -> Self {
        Self::new("bad_request", "Bad Request", StatusCode::BAD_REQUEST)
    }

    /// Unknown resource id (404)
    pub fn not_found() -> Self {
        Self::new("not_found", "resource not found", StatusCode::NOT_FOUND)
    }

    /// Incomplete or unusable request body (422)
    pub fn unprocessable() -> Self {
        Self::new(
            "unprocessable",
            "unprocessable",
            StatusCode::UNPROCESSABLE_ENTITY,
        )
    }

    /// Unexpected store or runtime failure (500)
    pub fn internal() -> Self {
        Self::new(
            "internal_error",
            "internal server error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }

    /// Upstream dependency failure, e.g. the issuer key set is unreachable (502)
    pub fn bad_gateway<S: ToString>(message: S) -> Self {
        Self::new("bad_gateway", message, StatusCode::BAD_GATEWAY)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(_) => Self::unprocessable(),
            StoreError::NotFound => Self::not_found(),
            _ => Self::internal(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code;
        let body = json!({
            "success": false,
            "error": self.code,
            "message": self.message,
        });
        (status_code, Json(body)).into_response()
    }
}
