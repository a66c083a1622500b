use axum::{extract::State, http::StatusCode, Json};
use common::circuit_breaker::CircuitBreakerState;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub store: String,
    /// Circuit state per remote service; empty when breakers are disabled
    pub circuit_breakers: BTreeMap<String, String>,
}

/// Health check endpoint. Reports "degraded" while any dependency circuit
/// is open, but stays 200 so the order list remains reachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut circuit_breakers = BTreeMap::new();
    let mut degraded = false;
    for breaker in &state.breakers {
        let breaker_state = breaker.get_state().await;
        degraded |= breaker_state == CircuitBreakerState::Open;
        circuit_breakers.insert(breaker.name().to_string(), breaker_state.as_str().to_string());
    }

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: if degraded { "degraded" } else { "healthy" }.to_string(),
            service: crate::SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: state.store_backend.to_string(),
            circuit_breakers,
        }),
    )
}
