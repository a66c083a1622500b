use async_trait::async_trait;
use common::circuit_breaker::{CircuitBreaker, CircuitBreakerError};
use common::config::DependencyConfig;
use common::metrics::{record_dependency_fetch, record_dependency_retry};
use domain::{Dependency, ProductSnapshot, UserSnapshot};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::errors::FetchError;
use crate::retry::RetryPolicy;

/// An entity owned by another service and readable at `GET /{RESOURCE}?id=N`
pub trait RemoteEntity: DeserializeOwned + Send + Sync + 'static {
    const RESOURCE: &'static str;
    const DEPENDENCY: Dependency;
}

impl RemoteEntity for UserSnapshot {
    const RESOURCE: &'static str = "users";
    const DEPENDENCY: Dependency = Dependency::User;
}

impl RemoteEntity for ProductSnapshot {
    const RESOURCE: &'static str = "products";
    const DEPENDENCY: Dependency = Dependency::Product;
}

/// Fetches one remote entity by id
#[async_trait]
pub trait EntityClient<T>: Send + Sync {
    async fn fetch(&self, id: i64) -> Result<T, FetchError>;
}

/// REST client for a single remote entity type. Stateless apart from the
/// shared connection pool and optional circuit breaker, so one instance
/// serves all requests.
pub struct HttpEntityClient<T> {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    breaker: Option<Arc<CircuitBreaker>>,
    _entity: PhantomData<fn() -> T>,
}

pub type UserClient = HttpEntityClient<UserSnapshot>;
pub type ProductClient = HttpEntityClient<ProductSnapshot>;

impl<T: RemoteEntity> HttpEntityClient<T> {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Share an existing connection pool
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            breaker: None,
            _entity: PhantomData,
        }
    }

    /// Client for `T`'s dependency as described by `config`
    pub fn from_config(client: reqwest::Client, config: &DependencyConfig) -> Self {
        let base_url = match T::DEPENDENCY {
            Dependency::User => &config.user_service_url,
            Dependency::Product => &config.product_service_url,
        };

        Self::with_client(client, base_url.as_str())
            .timeout(config.request_timeout)
            .retry(RetryPolicy::new(config.max_retries, config.retry_backoff))
    }

    /// Per-attempt deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, id: i64) -> String {
        format!("{}/{}?id={}", self.base_url, T::RESOURCE, id)
    }

    async fn attempt(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(e)
            }
        })?;

        serde_json::from_slice::<T>(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn guarded_attempt(&self, url: &str) -> Result<T, FetchError> {
        let Some(breaker) = &self.breaker else {
            return self.attempt(url).await;
        };

        breaker
            .call_classified(self.attempt(url), FetchError::is_transient)
            .await
            .map_err(|e| match e {
                CircuitBreakerError::Open => FetchError::CircuitOpen,
                CircuitBreakerError::Timeout => FetchError::Timeout,
                CircuitBreakerError::CallFailed(inner) => inner,
            })
    }
}

#[async_trait]
impl<T: RemoteEntity> EntityClient<T> for HttpEntityClient<T> {
    async fn fetch(&self, id: i64) -> Result<T, FetchError> {
        let dependency = T::DEPENDENCY.as_str();
        let url = self.endpoint(id);
        let start = Instant::now();
        let mut attempt = 1;

        let result = loop {
            match self.guarded_attempt(&url).await {
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts() => {
                    warn!(
                        dependency,
                        url = %url,
                        attempt,
                        error = %err,
                        "Remote fetch failed, retrying"
                    );
                    record_dependency_retry(dependency);
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                other => break other,
            }
        };

        let elapsed = start.elapsed();
        match &result {
            Ok(_) => {
                record_dependency_fetch(dependency, "success", elapsed.as_secs_f64());
                debug!(
                    dependency,
                    id,
                    duration_ms = %elapsed.as_millis(),
                    "Fetched remote entity"
                );
            }
            Err(err) => {
                record_dependency_fetch(dependency, &err.label(), elapsed.as_secs_f64());
                warn!(
                    dependency,
                    id,
                    attempts = attempt,
                    error = %err,
                    "Remote fetch failed"
                );
            }
        }

        result
    }
}
