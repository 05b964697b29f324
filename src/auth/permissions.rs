use http::StatusCode;

use super::{AuthClaims, AuthError};

/// Check that the verified claim set carries the required permission.
///
/// - No IO
/// - No side effects
/// - Runs only after TokenVerifier has accepted the token
pub fn check(claims: &AuthClaims, required: &str) -> Result<(), AuthError> {
    let permissions = claims.permissions.as_ref().ok_or_else(|| {
        AuthError::invalid_claims(StatusCode::BAD_REQUEST, "Permissions not included in JWT.")
    })?;

    if permissions.iter().any(|p| p == required) {
        Ok(())
    } else {
        Err(AuthError::unauthorized("Permission not found."))
    }
}
