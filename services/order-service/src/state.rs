use aggregator::{AggregatorConfig, OrderAggregator};
use anyhow::Result;
use common::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use common::config::{DependencyConfig, ServiceConfig};
use domain::{Dependency, ProductSnapshot, UserSnapshot};
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use remote_client::{EntityClient, HttpEntityClient, RemoteEntity};
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<OrderAggregator>,
    /// "postgres" or "in_memory", reported by `/health`
    pub store_backend: &'static str,
    pub breakers: Vec<Arc<CircuitBreaker>>,
}

impl AppState {
    pub fn new(aggregator: OrderAggregator, store_backend: &'static str) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            store_backend,
            breakers: Vec::new(),
        }
    }

    pub fn with_breakers(mut self, breakers: Vec<Arc<CircuitBreaker>>) -> Self {
        self.breakers = breakers;
        self
    }

    /// Wire the store and both remote clients from configuration
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let store_backend = if config.database.is_some() { "postgres" } else { "in_memory" };
        let store: Arc<dyn OrderStore> = match &config.database {
            Some(db) => {
                info!("Connecting to database: {}", db.redacted_url());
                let store = PostgresOrderStore::connect(&db.url, db.max_connections).await?;
                store.ensure_schema().await?;
                Arc::new(store)
            }
            None => {
                info!("DATABASE_URL not set, using in-memory order store");
                Arc::new(InMemoryOrderStore::new())
            }
        };

        // One connection pool shared by both clients
        let http = reqwest::Client::builder().build()?;
        let deps = &config.dependencies;

        info!(
            user_service = %deps.user_service_url,
            product_service = %deps.product_service_url,
            max_retries = deps.max_retries,
            circuit_breaker = deps.circuit_breaker_enabled,
            "Configuring remote clients"
        );

        let mut breakers = Vec::new();
        let users: Arc<dyn EntityClient<UserSnapshot>> =
            Arc::new(build_client(http.clone(), deps, &mut breakers));
        let products: Arc<dyn EntityClient<ProductSnapshot>> =
            Arc::new(build_client(http, deps, &mut breakers));

        let aggregator = OrderAggregator::new(store, users, products).with_config(AggregatorConfig {
            concurrent_fetch: config.concurrent_fetch,
        });

        Ok(Self::new(aggregator, store_backend).with_breakers(breakers))
    }
}

fn build_client<T: RemoteEntity>(
    http: reqwest::Client,
    deps: &DependencyConfig,
    breakers: &mut Vec<Arc<CircuitBreaker>>,
) -> HttpEntityClient<T> {
    let client = HttpEntityClient::<T>::from_config(http, deps);
    if !deps.circuit_breaker_enabled {
        return client;
    }

    info!("Initializing circuit breaker for {}", T::DEPENDENCY.service_name());
    let breaker = Arc::new(breaker_for(T::DEPENDENCY, deps));
    breakers.push(breaker.clone());
    client.circuit_breaker(breaker)
}

fn breaker_for(dependency: Dependency, deps: &DependencyConfig) -> CircuitBreaker {
    CircuitBreaker::new(
        dependency.service_name(),
        CircuitBreakerConfig {
            failure_threshold: deps.circuit_breaker_failure_threshold,
            timeout: deps.request_timeout,
            ..CircuitBreakerConfig::default()
        },
    )
}
