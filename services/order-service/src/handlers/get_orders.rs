use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub id: Option<String>,
}

/// `GET /orders?id=N` returns one enriched order, `GET /orders` the bare list
pub async fn handle(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Response, ApiError> {
    // A blank id is treated like no id at all
    let Some(raw_id) = query.id.filter(|v| !v.trim().is_empty()) else {
        let orders = state.aggregator.list_orders().await?;
        info!("Listed {} orders", orders.len());
        return Ok(Json(orders).into_response());
    };

    let order_id: i64 = raw_id
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid order ID"))?;

    info!("Fetching order: {}", order_id);
    let order = state.aggregator.get_order(order_id).await?;
    Ok(Json(order).into_response())
}
