use serde::Deserialize;

/// Specifies which drink store implementation to use
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

/// Configuration for the persistence subsystem
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Store backend: "memory" (default) or "postgres"
    #[serde(default)]
    pub backend: StoreBackend,

    /// Postgres specific configuration
    #[serde(default)]
    pub postgres: PostgresConfig,
}

/// Postgres store configuration options
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresConfig {
    /// Postgres connection string
    #[serde(default)]
    pub url: String,

    /// Maximum pool connections (default: 5)
    #[serde(default = "default_connections")]
    pub connections: u32,
}

fn default_connections() -> u32 {
    5
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connections: default_connections(),
        }
    }
}
