mod support;

use aggregator::{AggregatorConfig, AggregatorError, ErrorKind, OrderAggregator};
use domain::Dependency;
use order_store::{InMemoryOrderStore, OrderStore};
use remote_client::{FetchError, ProductClient, UserClient};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use support::StubService;

struct Harness {
    users: StubService,
    products: StubService,
    store: Arc<InMemoryOrderStore>,
    aggregator: Arc<OrderAggregator>,
}

async fn setup(config: AggregatorConfig) -> Harness {
    let users = StubService::start(
        "users",
        vec![
            json!({ "id": 1, "name": "Jane", "email": "jane@x.com" }),
            json!({ "id": 2, "name": "John Doe", "email": "john@example.com",
                    "created_at": "2024-01-01T00:00:00Z" }),
        ],
    )
    .await;
    let products = StubService::start(
        "products",
        vec![json!({ "id": 1, "name": "Widget", "price": 9.99, "category": "Tools" })],
    )
    .await;

    let store = Arc::new(InMemoryOrderStore::new());
    let aggregator = OrderAggregator::new(
        store.clone(),
        Arc::new(UserClient::new(users.base_url.clone())),
        Arc::new(ProductClient::new(products.base_url.clone())),
    )
    .with_config(config);

    Harness {
        users,
        products,
        store,
        aggregator: Arc::new(aggregator),
    }
}

#[tokio::test]
async fn test_create_then_product_service_stops() {
    let mut h = setup(AggregatorConfig::default()).await;

    let created = h.aggregator.create_order(1, 1).await.unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.user_id, 1);
    assert_eq!(created.product_id, 1);

    let user = created.user.unwrap();
    assert_eq!(user.name, "Jane");
    assert_eq!(user.email, "jane@x.com");
    let product = created.product.unwrap();
    assert_eq!(product.name, "Widget");
    assert_eq!(product.price, 9.99);
    assert_eq!(product.category, "Tools");

    h.products.stop().await;

    let err = h.aggregator.get_order(1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
    assert_eq!(err.dependency(), Some(Dependency::Product));
}

#[tokio::test]
async fn test_create_persists_exactly_one_order() {
    let h = setup(AggregatorConfig::default()).await;

    let created = h.aggregator.create_order(2, 1).await.unwrap();

    let stored = h.store.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, created.id);
    assert_eq!(stored[0].user_id, 2);
    assert!(created.user.unwrap().created_at.is_some());
}

#[tokio::test]
async fn test_unknown_user_creates_nothing() {
    let h = setup(AggregatorConfig::default()).await;

    let err = h.aggregator.create_order(99, 1).await.unwrap_err();

    assert!(matches!(
        err,
        AggregatorError::DependencyUnavailable {
            dependency: Dependency::User,
            source: FetchError::Status(404),
        }
    ));
    assert!(h.store.is_empty().await);
    assert_eq!(h.products.hits(), 0);
}

#[tokio::test]
async fn test_unknown_product_creates_nothing() {
    let h = setup(AggregatorConfig::default()).await;

    let err = h.aggregator.create_order(1, 99).await.unwrap_err();

    assert_eq!(err.dependency(), Some(Dependency::Product));
    assert!(h.store.is_empty().await);
    assert_eq!(h.users.hits(), 1);
}

#[tokio::test]
async fn test_missing_order_is_not_found_even_with_dependencies_down() {
    let mut h = setup(AggregatorConfig::default()).await;
    h.users.stop().await;
    h.products.stop().await;

    let err = h.aggregator.get_order(999).await.unwrap_err();
    assert!(matches!(err, AggregatorError::NotFound(999)));
}

#[tokio::test]
async fn test_existing_order_unreadable_when_user_service_fails() {
    let h = setup(AggregatorConfig::default()).await;
    let created = h.aggregator.create_order(1, 1).await.unwrap();

    h.users.set_available(false);

    let err = h.aggregator.get_order(created.id).await.unwrap_err();
    assert!(matches!(
        err,
        AggregatorError::DependencyUnavailable {
            dependency: Dependency::User,
            source: FetchError::Status(503),
        }
    ));

    h.users.set_available(true);
    assert!(h.aggregator.get_order(created.id).await.is_ok());
}

#[tokio::test]
async fn test_get_reflects_current_remote_state() {
    let h = setup(AggregatorConfig::default()).await;
    let created = h.aggregator.create_order(1, 1).await.unwrap();

    h.users
        .upsert(json!({ "id": 1, "name": "Jane Smith", "email": "jane@smith.com" }));

    let details = h.aggregator.get_order(created.id).await.unwrap();
    let user = details.user.unwrap();
    assert_eq!(user.name, "Jane Smith");
    assert_eq!(user.email, "jane@smith.com");
}

#[tokio::test]
async fn test_malformed_remote_body_is_dependency_failure() {
    let h = setup(AggregatorConfig::default()).await;
    h.products
        .upsert(json!({ "id": 1, "name": "Widget", "category": "Tools" }));

    let err = h.aggregator.create_order(1, 1).await.unwrap_err();

    assert!(matches!(
        err,
        AggregatorError::DependencyUnavailable {
            dependency: Dependency::Product,
            source: FetchError::Decode(_),
        }
    ));
    assert!(h.store.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fifty_concurrent_creates() {
    let h = setup(AggregatorConfig::default()).await;

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let aggregator = h.aggregator.clone();
            tokio::spawn(async move { aggregator.create_order(1, 1).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap().id);
    }

    assert_eq!(ids.len(), 50);
    assert_eq!(h.store.list().await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_list_makes_no_remote_calls() {
    let mut h = setup(AggregatorConfig::default()).await;
    h.aggregator.create_order(1, 1).await.unwrap();
    h.aggregator.create_order(2, 1).await.unwrap();
    let user_hits = h.users.hits();
    let product_hits = h.products.hits();

    h.users.stop().await;
    h.products.stop().await;

    let orders = h.aggregator.list_orders().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(h.users.hits(), user_hits);
    assert_eq!(h.products.hits(), product_hits);
}

#[tokio::test]
async fn test_concurrent_fetch_mode_hits_both_services() {
    let h = setup(AggregatorConfig {
        concurrent_fetch: true,
    })
    .await;
    h.users.set_available(false);
    h.products.set_available(false);

    let err = h.aggregator.create_order(1, 1).await.unwrap_err();

    assert_eq!(err.dependency(), Some(Dependency::User));
    assert_eq!(h.users.hits(), 1);
    assert_eq!(h.products.hits(), 1);
    assert!(h.store.is_empty().await);
}
