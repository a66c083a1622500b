use serde::{Deserialize, Serialize};
use std::fmt;

/// A remote service the order service consults when assembling order details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependency {
    User,
    Product,
}

impl Dependency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dependency::User => "user",
            Dependency::Product => "product",
        }
    }

    /// Name used for circuit breakers and metric labels
    pub fn service_name(&self) -> &'static str {
        match self {
            Dependency::User => "user-service",
            Dependency::Product => "product-service",
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
