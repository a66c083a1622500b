//! Stub user/product services speaking the `GET /{resource}?id=N` contract.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Clone)]
struct StubState {
    entities: Arc<RwLock<HashMap<i64, Value>>>,
    available: Arc<AtomicBool>,
    hits: Arc<AtomicUsize>,
}

async fn lookup(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if !state.available.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response();
    }

    let Some(id) = params.get("id").and_then(|v| v.parse::<i64>().ok()) else {
        return (StatusCode::BAD_REQUEST, "Invalid ID").into_response();
    };

    match state.entities.read().unwrap().get(&id) {
        Some(entity) => Json(entity.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

pub struct StubService {
    pub base_url: String,
    state: StubState,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StubService {
    /// Serve `entities` (keyed by their `id` field) under `/{resource}`
    pub async fn start(resource: &str, entities: Vec<Value>) -> Self {
        let entities = entities
            .into_iter()
            .map(|e| (e["id"].as_i64().expect("stub entity needs an id"), e))
            .collect();

        let state = StubState {
            entities: Arc::new(RwLock::new(entities)),
            available: Arc::new(AtomicBool::new(true)),
            hits: Arc::new(AtomicUsize::new(0)),
        };

        let router = Router::new()
            .route(&format!("/{}", resource), get(lookup))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub listener");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            base_url,
            state,
            shutdown: Some(tx),
            task: Some(task),
        }
    }

    /// Toggle between answering normally and answering 503
    pub fn set_available(&self, available: bool) {
        self.state.available.store(available, Ordering::SeqCst);
    }

    pub fn upsert(&self, entity: Value) {
        let id = entity["id"].as_i64().expect("stub entity needs an id");
        self.state.entities.write().unwrap().insert(id, entity);
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Stop listening; later requests fail at the transport level
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}
