pub mod errors;
pub mod order_aggregator;

pub use errors::{AggregatorError, ErrorKind};
pub use order_aggregator::{AggregatorConfig, OrderAggregator};
