use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Reject non-positive identifiers before they reach storage or a remote call
pub fn ensure_positive_id(field: &str, id: i64) -> Result<i64, DomainError> {
    if id <= 0 {
        return Err(DomainError::ValidationError(format!(
            "{} must be a positive integer, got {}",
            field, id
        )));
    }
    Ok(id)
}
