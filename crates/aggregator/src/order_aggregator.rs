//! Order aggregation: validates references against the user and product
//! services, persists the order, and assembles the composite view.
//!
//! Every operation is all-or-nothing. An order is only written after both
//! remote fetches succeeded, and no `OrderWithDetails` is ever returned with
//! a snapshot missing.

use common::metrics::record_order_operation;
use domain::errors::ensure_positive_id;
use domain::{Dependency, Order, OrderWithDetails, ProductSnapshot, UserSnapshot};
use order_store::OrderStore;
use remote_client::EntityClient;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AggregatorError;

#[derive(Debug, Clone, Default)]
pub struct AggregatorConfig {
    /// Issue the user and product fetches concurrently instead of one after
    /// the other
    pub concurrent_fetch: bool,
}

/// Orchestrates the order store and the two remote entity clients
pub struct OrderAggregator {
    store: Arc<dyn OrderStore>,
    users: Arc<dyn EntityClient<UserSnapshot>>,
    products: Arc<dyn EntityClient<ProductSnapshot>>,
    config: AggregatorConfig,
}

impl OrderAggregator {
    pub fn new(
        store: Arc<dyn OrderStore>,
        users: Arc<dyn EntityClient<UserSnapshot>>,
        products: Arc<dyn EntityClient<ProductSnapshot>>,
    ) -> Self {
        Self {
            store,
            users,
            products,
            config: AggregatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Create an order after confirming both referenced entities exist
    pub async fn create_order(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<OrderWithDetails, AggregatorError> {
        let span = info_span!(
            "create_order",
            correlation_id = %Uuid::new_v4(),
            user_id,
            product_id
        );

        observe("create_order", async {
            ensure_positive_id("user_id", user_id)?;
            ensure_positive_id("product_id", product_id)?;

            let (user, product) = self.fetch_details(user_id, product_id).await?;
            let order = self.store.create(user_id, product_id).await?;

            info!(order_id = order.id, "Order created");
            Ok::<_, AggregatorError>(OrderWithDetails::assemble(order, user, product))
        })
        .instrument(span)
        .await
    }

    /// Load an order and re-fetch its user and product from the remote services
    pub async fn get_order(&self, order_id: i64) -> Result<OrderWithDetails, AggregatorError> {
        let span = info_span!("get_order", correlation_id = %Uuid::new_v4(), order_id);

        observe("get_order", async {
            ensure_positive_id("order_id", order_id)?;

            let order = self
                .store
                .get(order_id)
                .await?
                .ok_or(AggregatorError::NotFound(order_id))?;

            let (user, product) = self.fetch_details(order.user_id, order.product_id).await?;
            Ok::<_, AggregatorError>(OrderWithDetails::assemble(order, user, product))
        })
        .instrument(span)
        .await
    }

    /// All orders without remote enrichment. Never calls a dependency.
    pub async fn list_orders(&self) -> Result<Vec<Order>, AggregatorError> {
        let span = info_span!("list_orders", correlation_id = %Uuid::new_v4());

        observe("list_orders", async { Ok::<_, AggregatorError>(self.store.list().await?) })
            .instrument(span)
            .await
    }

    async fn fetch_details(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<(UserSnapshot, ProductSnapshot), AggregatorError> {
        if !self.config.concurrent_fetch {
            let user = self.fetch_user(user_id).await?;
            let product = self.fetch_product(product_id).await?;
            return Ok((user, product));
        }

        match tokio::join!(self.fetch_user(user_id), self.fetch_product(product_id)) {
            (Ok(user), Ok(product)) => Ok((user, product)),
            (Err(user_err), Err(product_err)) => {
                // Only one error can be returned; the user failure wins
                error!(
                    error = %product_err,
                    "Product fetch also failed while user fetch failed"
                );
                Err(user_err)
            }
            (Err(err), Ok(_)) | (Ok(_), Err(err)) => Err(err),
        }
    }

    async fn fetch_user(&self, user_id: i64) -> Result<UserSnapshot, AggregatorError> {
        self.users
            .fetch(user_id)
            .await
            .map_err(|source| AggregatorError::DependencyUnavailable {
                dependency: Dependency::User,
                source,
            })
    }

    async fn fetch_product(&self, product_id: i64) -> Result<ProductSnapshot, AggregatorError> {
        self.products
            .fetch(product_id)
            .await
            .map_err(|source| AggregatorError::DependencyUnavailable {
                dependency: Dependency::Product,
                source,
            })
    }
}

async fn observe<T, F>(operation: &'static str, f: F) -> Result<T, AggregatorError>
where
    F: Future<Output = Result<T, AggregatorError>>,
{
    let start = Instant::now();
    let result = f.await;
    let elapsed = start.elapsed();

    record_order_operation(operation, result.is_ok(), elapsed.as_secs_f64());
    if let Err(e) = &result {
        warn!(
            operation,
            kind = e.kind().as_str(),
            error = %e,
            duration_ms = %elapsed.as_millis(),
            "Order operation failed"
        );
    }

    result
}
