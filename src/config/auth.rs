use serde::Deserialize;

/// Configuration for the token issuer and verification
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Base URL of the token issuer, e.g. `https://tenant.auth0.com/`.
    /// The public key set is expected at `{issuer}.well-known/jwks.json`,
    /// and the `iss` claim of presented tokens must match this value exactly.
    #[serde(default)]
    pub issuer: String,

    /// Expected `aud` claim of presented tokens
    #[serde(default)]
    pub audience: String,

    /// Signing key cache TTL in seconds (default: 1 hour).
    /// Issuer keys are long-lived, so a generous TTL is fine.
    #[serde(default = "default_ttl")]
    pub ttl: u64,
}

fn default_ttl() -> u64 {
    3600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            audience: String::new(),
            ttl: default_ttl(),
        }
    }
}
