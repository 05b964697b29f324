use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DrinkStore, StoreError};
use crate::models::{Drink, NewDrink};

/// In-process store keeping rows in a BTreeMap, so iteration order is the id
/// order and stays stable within a process run. Default backend for
/// development and the test fixture.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    rows: BTreeMap<i64, Drink>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DrinkStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let mut inner = self.inner.write().await;
        // Same uniqueness rule the relational schema enforces
        if inner.rows.values().any(|row| row.title == drink.title) {
            return Err(StoreError::Constraint(format!(
                "duplicate title: {}",
                drink.title
            )));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        let drink = drink.into_drink(id);
        inner.rows.insert(id, drink.clone());
        Ok(drink)
    }

    async fn update(&self, drink: &Drink) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&drink.id) {
            return Err(StoreError::NotFound);
        }
        inner.rows.insert(drink.id, drink.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    fn new_drink(title: &str) -> NewDrink {
        NewDrink::new(
            title.to_string(),
            &[Ingredient {
                name: "Water".to_string(),
                color: "blue".to_string(),
                parts: 1,
            }],
        )
        .expect("Failed to build drink")
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let first = store.insert(new_drink("Americano")).await.unwrap();
        let second = store.insert(new_drink("Espresso")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_list_all_is_id_ordered() {
        let store = MemoryStore::new();
        for title in ["Mocha", "Latte", "Cortado"] {
            store.insert(new_drink(title)).await.unwrap();
        }
        let ids: Vec<i64> = store.list_all().await.unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_duplicate_title_is_a_constraint_violation() {
        let store = MemoryStore::new();
        store.insert(new_drink("Flat White")).await.unwrap();
        let err = store.insert(new_drink("Flat White")).await.err().unwrap();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let store = MemoryStore::new();
        let phantom = new_drink("Ghost").into_drink(42);
        let err = store.update(&phantom).await.err().unwrap();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let store = MemoryStore::new();
        let mut drink = store.insert(new_drink("Latte")).await.unwrap();
        drink.title = "Oat Latte".to_string();
        store.update(&drink).await.unwrap();

        let fetched = store.get_by_id(drink.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Oat Latte");
    }

    #[tokio::test]
    async fn test_delete_is_not_idempotent() {
        let store = MemoryStore::new();
        let drink = store.insert(new_drink("Doppio")).await.unwrap();
        store.delete(drink.id).await.unwrap();
        let err = store.delete(drink.id).await.err().unwrap();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = store.insert(new_drink("Americano")).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.insert(new_drink("Espresso")).await.unwrap();
        assert_eq!(second.id, 2);
    }
}
