use thiserror::Error;

use crate::models::{Drink, NewDrink};

pub mod memory;
pub mod postgres;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

/// DrinkStore trait defining the interface for all persistence backends.
///
/// Implementations must be thread-safe (Send + Sync) and cloneable so the
/// store can be shared across handlers. `list_all` must return rows in
/// stable id order within a process run.
#[async_trait::async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks, in stable id order
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError>;

    /// A single drink by id, or None if the id is unknown
    async fn get_by_id(&self, id: i64) -> Result<Option<Drink>, StoreError>;

    /// Persist a new drink and assign its id
    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError>;

    /// Persist the record's current field values for its id
    async fn update(&self, drink: &Drink) -> Result<(), StoreError>;

    /// Remove the row; fails with `StoreError::NotFound` if it is absent
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Performs a health check on the store backend.
    ///
    /// For Postgres this issues a trivial query against the pool; for the
    /// memory store it always succeeds.
    async fn health_check(&self) -> Result<(), String>;
}

/// Store implementation that provides a uniform interface regardless of
/// backend. The concrete implementation is chosen at startup based on the
/// application configuration.
#[derive(Clone)]
pub enum Store {
    /// In-process store backed by a BTreeMap, for development and tests
    Memory(memory::MemoryStore),
    /// Postgres-backed store
    Postgres(postgres::PostgresStore),
}

#[async_trait::async_trait]
impl DrinkStore for Store {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        match self {
            Self::Memory(store) => store.list_all().await,
            Self::Postgres(store) => store.list_all().await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        match self {
            Self::Memory(store) => store.get_by_id(id).await,
            Self::Postgres(store) => store.get_by_id(id).await,
        }
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        match self {
            Self::Memory(store) => store.insert(drink).await,
            Self::Postgres(store) => store.insert(drink).await,
        }
    }

    async fn update(&self, drink: &Drink) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.update(drink).await,
            Self::Postgres(store) => store.update(drink).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.delete(id).await,
            Self::Postgres(store) => store.delete(id).await,
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        match self {
            Self::Memory(store) => store.health_check().await,
            Self::Postgres(store) => store.health_check().await,
        }
    }
}

/// Factory function to create the appropriate store implementation based on
/// configuration. Connecting the Postgres backend also runs schema setup, so
/// by the time this returns the store is ready to serve requests.
pub async fn create_store(config: &crate::config::BarbackConfig) -> Result<Store, StoreError> {
    match config.store.backend {
        crate::config::StoreBackend::Memory => Ok(Store::Memory(memory::MemoryStore::new())),
        crate::config::StoreBackend::Postgres => {
            if config.store.postgres.url.is_empty() {
                return Err(StoreError::Config(
                    "Postgres URL is required for the Postgres store".to_string(),
                ));
            }
            let store = postgres::PostgresStore::connect(
                &config.store.postgres.url,
                config.store.postgres.connections,
            )
            .await?;
            Ok(Store::Postgres(store))
        }
    }
}
