use http::{HeaderValue, StatusCode};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use log::debug;
use thiserror::Error;

use super::jwks::{KeySetClient, KeySetError};
use super::{AuthClaims, AuthError};
use crate::config::AuthConfig;

/// Failures from token verification. Auth failures belong to the caller;
/// key set failures belong to the issuer and are mapped to 502 upstream.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    KeySet(#[from] KeySetError),
}

/// Verifies RS256 bearer tokens against the configured issuer.
///
/// Stateless apart from the key cache: safe to call repeatedly, claims are
/// never cached across requests.
#[derive(Clone)]
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    keys: KeySetClient,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig, http: reqwest::Client) -> Result<Self, KeySetError> {
        let keys = KeySetClient::new(&config.issuer, config.ttl, http)?;
        Ok(Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            keys,
        })
    }

    /// Validate the Authorization header end to end: bearer framing, key
    /// lookup by `kid`, signature, expiry, audience and issuer. Returns the
    /// decoded claim set on success.
    pub async fn verify(&self, header: Option<&HeaderValue>) -> Result<AuthClaims, VerifyError> {
        let token = parse_bearer_token(header)?;

        let token_header = decode_header(token).map_err(|_| {
            AuthError::invalid_header(
                StatusCode::BAD_REQUEST,
                "Unable to parse authentication token.",
            )
        })?;
        let kid = token_header.kid.ok_or_else(|| {
            AuthError::invalid_header(
                StatusCode::UNAUTHORIZED,
                "Unable to find the appropriate key.",
            )
        })?;

        let jwk = self.keys.key_for(&kid).await?.ok_or_else(|| {
            AuthError::invalid_header(
                StatusCode::UNAUTHORIZED,
                "Unable to find the appropriate key.",
            )
        })?;
        let (n, e) = match (&jwk.n, &jwk.e) {
            (Some(n), Some(e)) => (n.as_str(), e.as_str()),
            _ => {
                return Err(AuthError::invalid_header(
                    StatusCode::UNAUTHORIZED,
                    "Unable to find the appropriate key.",
                )
                .into())
            }
        };
        let key = DecodingKey::from_rsa_components(n, e).map_err(|_| {
            AuthError::invalid_header(
                StatusCode::BAD_REQUEST,
                "Unable to parse authentication token.",
            )
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<AuthClaims>(token, &key, &validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::token_expired(),
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => AuthError::invalid_claims(
                    StatusCode::UNAUTHORIZED,
                    "Incorrect claims. Please, check the audience and issuer.",
                ),
                _ => AuthError::invalid_header(
                    StatusCode::BAD_REQUEST,
                    "Unable to parse authentication token.",
                ),
            }
        })?;

        debug!("Verified token for subject {}", data.claims.sub);
        Ok(data.claims)
    }
}

/// Extract the raw token from an Authorization header value, enforcing the
/// `Bearer <token>` framing.
fn parse_bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let header = header.ok_or_else(|| {
        AuthError::invalid_header(
            StatusCode::UNAUTHORIZED,
            "Authorization header is expected.",
        )
    })?;
    let value = header.to_str().map_err(|_| {
        AuthError::invalid_header(
            StatusCode::UNAUTHORIZED,
            "Authorization header must be bearer token.",
        )
    })?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match *parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => {
            Err(AuthError::invalid_header(
                StatusCode::UNAUTHORIZED,
                "Authorization header must start with \"Bearer\".",
            ))
        }
        [_] => Err(AuthError::invalid_header(
            StatusCode::UNAUTHORIZED,
            "Token not found.",
        )),
        _ => Err(AuthError::invalid_header(
            StatusCode::UNAUTHORIZED,
            "Authorization header must be bearer token.",
        )),
    }
}
