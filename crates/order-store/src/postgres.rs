use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::Order;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, FromRow, PgPool};
use std::time::Instant;

use crate::{observe, OrderStore, StoreError};

const SCHEMA: &str = include_str!("../migrations/0001_create_orders.sql");

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of OrderStore. Ids come from a BIGSERIAL
/// sequence, so concurrent inserts never collide.
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the orders table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.pool.execute(SCHEMA).await?;
        tracing::info!("Orders schema ready");
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create(&self, user_id: i64, product_id: i64) -> Result<Order, StoreError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (user_id, product_id, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            RETURNING id, user_id, product_id, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map(Order::from)
        .map_err(StoreError::from);

        observe("create", start, &result);
        result
    }

    async fn get(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, product_id, created_at, updated_at
            FROM orders
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Order::from))
        .map_err(StoreError::from);

        observe("get", start, &result);
        result
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, product_id, created_at, updated_at
            FROM orders
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(Order::from).collect())
        .map_err(StoreError::from);

        observe("list", start, &result);
        result
    }
}
