use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use domain::{CreateOrderCommand, OrderWithDetails};
use tracing::{error, info};
use validator::Validate;

use super::error::ApiError;
use crate::state::AppState;

/// Handle create order request
pub async fn handle(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderCommand>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderWithDetails>), ApiError> {
    let Json(cmd) = payload.map_err(|e| {
        error!("Rejected order payload: {}", e);
        ApiError::bad_request("Invalid JSON")
    })?;

    info!(
        "Received create order request for user {} and product {}",
        cmd.user_id, cmd.product_id
    );

    if let Err(e) = cmd.validate() {
        error!("Validation error: {}", e);
        return Err(ApiError::bad_request(format!("Validation error: {}", e)));
    }

    let order = state
        .aggregator
        .create_order(cmd.user_id, cmd.product_id)
        .await?;

    info!("Order created successfully: {}", order.id);
    Ok((StatusCode::CREATED, Json(order)))
}
