use domain::{Dependency, DomainError};
use order_store::StoreError;
use remote_client::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    NotFound(i64),

    #[error("Failed to fetch {dependency}: {source}")]
    DependencyUnavailable {
        dependency: Dependency,
        #[source]
        source: FetchError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Coarse classification the API surface maps onto status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    DependencyUnavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::DependencyUnavailable => "dependency_unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl AggregatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AggregatorError::Validation(_) => ErrorKind::Validation,
            AggregatorError::NotFound(_) => ErrorKind::NotFound,
            AggregatorError::DependencyUnavailable { .. } => ErrorKind::DependencyUnavailable,
            AggregatorError::Storage(_) => ErrorKind::Internal,
        }
    }

    /// The dependency that failed, if any
    pub fn dependency(&self) -> Option<Dependency> {
        match self {
            AggregatorError::DependencyUnavailable { dependency, .. } => Some(*dependency),
            _ => None,
        }
    }
}

impl From<DomainError> for AggregatorError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError(msg) => AggregatorError::Validation(msg),
        }
    }
}
