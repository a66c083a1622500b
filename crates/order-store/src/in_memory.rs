use async_trait::async_trait;
use chrono::Utc;
use domain::Order;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::{observe, OrderStore, StoreError};

struct Inner {
    orders: HashMap<i64, Order>,
    next_id: i64,
}

/// Process-local order store. Ids start at 1 and are never reused.
pub struct InMemoryOrderStore {
    inner: RwLock<Inner>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                orders: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, user_id: i64, product_id: i64) -> Result<Order, StoreError> {
        let start = Instant::now();

        // Id assignment and insert share one write lock
        let order = {
            let mut inner = self.inner.write().await;
            let id = inner.next_id;
            inner.next_id += 1;

            let order = Order::new(id, user_id, product_id, Utc::now());
            inner.orders.insert(id, order.clone());
            order
        };

        tracing::debug!(order_id = order.id, user_id, product_id, "Order stored");
        let result = Ok(order);
        observe("create", start, &result);
        result
    }

    async fn get(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let start = Instant::now();
        let result = Ok(self.inner.read().await.orders.get(&id).cloned());
        observe("get", start, &result);
        result
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let start = Instant::now();
        let mut orders: Vec<Order> = self.inner.read().await.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.id);

        let result = Ok(orders);
        observe("list", start, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryOrderStore::new();

        let first = store.create(1, 10).await.unwrap();
        let second = store.create(2, 20).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.user_id, 2);
        assert_eq!(second.product_id, 20);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_get_returns_stored_order() {
        let store = InMemoryOrderStore::new();
        let created = store.create(3, 4).await.unwrap();

        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = InMemoryOrderStore::new();
        assert_eq!(store.get(99).await.unwrap(), None);
    }

    #[test]
    fn test_list_empty_store() {
        let store = InMemoryOrderStore::new();
        let orders = tokio_test::block_on(store.list()).unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = Arc::new(InMemoryOrderStore::new());

        let handles: Vec<_> = (0..100)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create(i + 1, i + 1).await.unwrap().id })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 100);
        assert_eq!(store.len().await, 100);
        assert_eq!(store.list().await.unwrap().len(), 100);
    }
}
