pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;

use async_trait::async_trait;
use domain::Order;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for order records
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Assign a fresh id, stamp timestamps and persist a new order
    async fn create(&self, user_id: i64, product_id: i64) -> Result<Order, StoreError>;

    /// Get a single order by ID
    async fn get(&self, id: i64) -> Result<Option<Order>, StoreError>;

    /// List all orders
    async fn list(&self) -> Result<Vec<Order>, StoreError>;
}

pub(crate) fn observe<T>(operation: &str, start: Instant, result: &Result<T, StoreError>) {
    common::metrics::record_store_operation(
        operation,
        result.is_ok(),
        start.elapsed().as_secs_f64(),
    );
}
