use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshots::{ProductSnapshot, UserSnapshot};

/// Persisted order record. Holds references only; user and product data live
/// in their own services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: i64, user_id: i64, product_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            product_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Order merged with the snapshots fetched for this request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithDetails {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderWithDetails {
    pub fn assemble(order: Order, user: UserSnapshot, product: ProductSnapshot) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            product_id: order.product_id,
            user: Some(user),
            product: Some(product),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
