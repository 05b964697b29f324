use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::AUTHORIZATION;
use log::{debug, error, warn};

use crate::auth::{permissions, VerifyError};
use crate::errors::ApiError;
use crate::state::AppState;

/// Interceptor chain for protected routes: verify the bearer token, then
/// check the route's required permission. An auth failure short-circuits
/// here; the handler and the store are never reached.
///
/// Mounted per-route with `middleware::from_fn_with_state`, carrying the
/// required permission alongside the state. Verified claims are inserted
/// into request extensions for the handler.
pub(super) async fn authorization_middleware(
    State((state, permission)): State<(AppState, &'static str)>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match state
        .verifier
        .verify(request.headers().get(AUTHORIZATION))
        .await
    {
        Ok(claims) => claims,
        Err(VerifyError::Auth(err)) => {
            warn!("Rejected request to {}: {err}", request.uri().path());
            return err.into_response();
        }
        Err(VerifyError::KeySet(err)) => {
            error!("Failed to obtain issuer keys: {err}");
            return ApiError::bad_gateway("issuer key set is unreachable").into_response();
        }
    };

    if let Err(err) = permissions::check(&claims, permission) {
        warn!(
            "Subject {} denied '{permission}' on {}",
            claims.sub,
            request.uri().path()
        );
        return err.into_response();
    }

    debug!("Subject {} granted '{permission}'", claims.sub);
    request.extensions_mut().insert(claims);
    next.run(request).await
}
