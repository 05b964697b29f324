use std::time::Duration;

use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use super::{DrinkStore, StoreError};
use crate::models::{Drink, NewDrink};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS drinks (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL UNIQUE,
    recipe TEXT NOT NULL
)";

/// Postgres-backed store. Conflicting writes serialize through the engine's
/// transaction isolation; no application-level locking on top.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to Postgres and run schema setup. Bootstrap is explicit: the
    /// table is created here, once, before the server starts listening.
    pub async fn connect(url: &str, connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!("Connected to Postgres and ensured drinks schema");

        Ok(Self { pool })
    }

    fn drink_from_row(row: &sqlx::postgres::PgRow) -> Result<Drink, StoreError> {
        let id: i64 = row.try_get("id")?;
        let title: String = row.try_get("title")?;
        let recipe: String = row.try_get("recipe")?;
        Ok(Drink::from_columns(id, title, recipe))
    }

    fn map_database_error(err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                || db_err.is_check_violation()
                || db_err.is_foreign_key_violation()
            {
                return StoreError::Constraint(db_err.to_string());
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
impl DrinkStore for PostgresStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::drink_from_row).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        let row = sqlx::query("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::drink_from_row).transpose()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let row = sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id")
            .bind(&drink.title)
            .bind(drink.recipe_text())
            .fetch_one(&self.pool)
            .await
            .map_err(Self::map_database_error)?;
        let id: i64 = row.try_get("id")?;
        Ok(drink.into_drink(id))
    }

    async fn update(&self, drink: &Drink) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE drinks SET title = $2, recipe = $3 WHERE id = $1")
            .bind(drink.id)
            .bind(&drink.title)
            .bind(drink.recipe_text())
            .execute(&self.pool)
            .await
            .map_err(Self::map_database_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| format!("Postgres health check failed: {e}"))
    }
}
