use serde::{Deserialize, Serialize};
use validator::Validate;

/// Command to create a new order for an existing user and product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderCommand {
    #[validate(range(min = 1, message = "user_id must be a positive integer"))]
    pub user_id: i64,

    #[validate(range(min = 1, message = "product_id must be a positive integer"))]
    pub product_id: i64,
}
