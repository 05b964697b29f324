use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::auth::TokenVerifier;
use crate::config::BarbackConfig;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BarbackConfig>,
    pub store: Arc<Store>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    /// HTTP client used for issuer key set fetches
    fn create_issuer_client() -> Client {
        Client::builder()
            // Key fetches are a single small GET; keep timeouts tight
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .expect("Failed to create issuer HTTP client")
    }

    /// Build state around an already-constructed store. `main` calls this
    /// after explicit store bootstrap; the test fixture passes a memory
    /// store directly.
    pub fn with_existing_store(
        config: &BarbackConfig,
        store: Store,
    ) -> Result<Self, std::io::Error> {
        let verifier =
            TokenVerifier::new(&config.auth, Self::create_issuer_client()).map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Failed to create token verifier: {e}"),
                )
            })?;

        Ok(Self {
            config: Arc::new(config.clone()),
            store: Arc::new(store),
            verifier: Arc::new(verifier),
        })
    }
}
