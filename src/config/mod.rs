pub(crate) use crate::config::auth::AuthConfig;
pub(crate) use crate::config::store::{PostgresConfig, StoreBackend, StoreConfig};
use config::{Config as ConfigCrate, ConfigError};
use serde::Deserialize;

pub mod auth;
pub mod store;

/// Main configuration structure for the barback server
#[derive(Debug, Deserialize, Clone)]
pub struct BarbackConfig {
    /// The port the server will listen to (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Token issuer configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Drink store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_port() -> u16 {
    8000
}

impl Default for BarbackConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            auth: AuthConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl BarbackConfig {
    /// Creates a new config instance from `BARBACK_`-prefixed environment
    /// variables, e.g. `BARBACK_PORT`, `BARBACK_AUTH_ISSUER`,
    /// `BARBACK_STORE_POSTGRES_URL`.
    pub fn new() -> Result<Self, String> {
        ConfigCrate::builder()
            .add_source(
                config::Environment::with_prefix("BARBACK")
                    .prefix_separator("_")
                    .separator("_"),
            )
            .build()
            .map_err(|e: ConfigError| e.to_string())?
            .try_deserialize()
            .map_err(|e| e.to_string())
    }

    #[cfg(test)]
    pub fn for_test_with_issuer(issuer_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            auth: AuthConfig {
                issuer: format!("{}/", issuer_mock.uri()),
                audience: "drinks".to_string(),
                ttl: 60,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                postgres: PostgresConfig::default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BarbackConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.auth.issuer, "");
        assert_eq!(config.auth.audience, "");
        assert_eq!(config.auth.ttl, 3600);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.postgres.url, "");
        assert_eq!(config.store.postgres.connections, 5);
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("BARBACK_PORT", "9001");
        std::env::set_var("BARBACK_AUTH_ISSUER", "https://issuer.test/");
        std::env::set_var("BARBACK_AUTH_AUDIENCE", "drinks");

        let config = BarbackConfig::new().unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.auth.issuer, "https://issuer.test/");
        assert_eq!(config.auth.audience, "drinks");
        assert_eq!(config.store.backend, StoreBackend::Memory);

        std::env::remove_var("BARBACK_PORT");
        std::env::remove_var("BARBACK_AUTH_ISSUER");
        std::env::remove_var("BARBACK_AUTH_AUDIENCE");
    }
}
