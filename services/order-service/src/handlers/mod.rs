pub mod create_order;
pub mod error;
pub mod get_orders;
pub mod health;
