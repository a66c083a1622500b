pub mod commands;
pub mod dependency;
pub mod errors;
pub mod order;
pub mod snapshots;

pub use commands::order_commands::CreateOrderCommand;
pub use dependency::Dependency;
pub use errors::DomainError;
pub use order::{Order, OrderWithDetails};
pub use snapshots::{ProductSnapshot, UserSnapshot};
