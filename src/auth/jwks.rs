use http::StatusCode;
use log::debug;
use moka::future::Cache as MokaCache;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// A single key from the issuer's published key set. Only the members needed
/// for RS256 verification are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    /// RSA modulus, base64url
    #[serde(default)]
    pub n: Option<String>,
    /// RSA public exponent, base64url
    #[serde(default)]
    pub e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// Errors that can occur while obtaining issuer keys. These are upstream
/// failures, not auth outcomes: they surface as 502, never as 401/403.
#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("invalid issuer URL: {0}")]
    InvalidIssuer(#[from] url::ParseError),
    #[error("failed to fetch signing keys: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("issuer key set request failed with status: {0}")]
    InvalidStatus(StatusCode),
    #[error("failed to parse issuer key set: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fetches the issuer's public key set and caches individual keys by `kid`.
/// Issuer keys are long-lived, so the TTL can be generous; a cold lookup is
/// one network round trip to the issuer.
#[derive(Clone)]
pub struct KeySetClient {
    http: reqwest::Client,
    jwks_url: String,
    keys: MokaCache<String, Jwk>,
}

impl KeySetClient {
    pub fn new(issuer: &str, ttl_secs: u64, http: reqwest::Client) -> Result<Self, KeySetError> {
        // Parse up front so a bad issuer fails at startup, not per-request
        let base = Url::parse(issuer)?;
        let jwks_url = format!(
            "{}/.well-known/jwks.json",
            base.as_str().trim_end_matches('/')
        );

        let keys = MokaCache::builder()
            .time_to_live(std::time::Duration::from_secs(ttl_secs))
            .max_capacity(32)
            .build();

        Ok(Self {
            http,
            jwks_url,
            keys,
        })
    }

    /// The key matching `kid`, from cache or from a fresh fetch of the
    /// issuer's key set. `Ok(None)` means the issuer does not publish such a
    /// key, which callers treat as an auth failure.
    pub async fn key_for(&self, kid: &str) -> Result<Option<Jwk>, KeySetError> {
        if let Some(key) = self.keys.get(kid).await {
            return Ok(Some(key));
        }

        debug!("Key {kid} not cached, fetching key set from {}", self.jwks_url);
        let response = self.http.get(&self.jwks_url).send().await?;
        if !response.status().is_success() {
            return Err(KeySetError::InvalidStatus(response.status()));
        }
        let body = response.bytes().await?;
        let set: JwkSet = serde_json::from_slice(&body)?;

        let mut matched = None;
        for key in set.keys.into_iter().filter(|k| k.kty == "RSA") {
            if key.kid == kid {
                matched = Some(key.clone());
            }
            self.keys.insert(key.kid.clone(), key).await;
        }
        Ok(matched)
    }
}
