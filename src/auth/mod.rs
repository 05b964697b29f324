use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

pub mod jwks;
pub mod permissions;
pub mod token;

pub use token::{TokenVerifier, VerifyError};

/// Claim set extracted from a verified token. Derived per-request, never
/// persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthClaims {
    /// Subject the issuer vouches for
    pub sub: String,

    /// Fine-grained permission strings, e.g. `post:drinks`. Absent when the
    /// token format does not support permission-based authorization.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// Authentication or authorization failure.
///
/// Carries the exact code, status and description surfaced to the client
/// verbatim through the error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {description}")]
pub struct AuthError {
    pub code: &'static str,
    pub status: StatusCode,
    pub description: String,
}

impl AuthError {
    fn new(code: &'static str, status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            code,
            status,
            description: description.into(),
        }
    }

    /// Missing, non-bearer or otherwise unusable Authorization header
    pub fn invalid_header(status: StatusCode, description: impl Into<String>) -> Self {
        Self::new("invalid_header", status, description)
    }

    pub fn token_expired() -> Self {
        Self::new("token_expired", StatusCode::UNAUTHORIZED, "Token expired.")
    }

    /// Issuer/audience mismatch (401) or a token without a permissions
    /// claim (400)
    pub fn invalid_claims(status: StatusCode, description: impl Into<String>) -> Self {
        Self::new("invalid_claims", status, description)
    }

    /// Token is valid but lacks the required permission
    pub fn unauthorized(description: impl Into<String>) -> Self {
        Self::new("unauthorized", StatusCode::FORBIDDEN, description)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({
            "success": false,
            "error": self.code,
            "message": self.description,
        });
        (self.status, Json(body)).into_response()
    }
}
