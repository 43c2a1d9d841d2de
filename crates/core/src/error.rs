//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every operation of the marketplace core fails with one of these. Callers
/// that need a stable, machine-checkable code use [`DomainError::kind`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced product, contact, order, shop or stock record is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The acting principal may not perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed request data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A status token outside the known set.
    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    /// A known status that is not reachable from the current one.
    #[error("illegal transition from '{from}' to '{to}'")]
    IllegalTransition { from: String, to: String },

    /// Confirmation-time stock shortfall.
    #[error("insufficient stock for '{product}'")]
    InsufficientStock { product: String },

    /// A concurrent modification won the race (stale expectation, ownership clash).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The transactional backend failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Stable error classification exposed to callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidInput,
    InsufficientStock,
    Conflict,
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::InsufficientStock => "insufficient_stock",
            ErrorKind::Conflict => "conflict",
            ErrorKind::StorageFailure => "storage_failure",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn insufficient_stock(product: impl Into<String>) -> Self {
        Self::InsufficientStock {
            product: product.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Forbidden(_) => ErrorKind::Forbidden,
            DomainError::InvalidInput(_)
            | DomainError::InvalidStatus(_)
            | DomainError::IllegalTransition { .. } => ErrorKind::InvalidInput,
            DomainError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::Storage(_) => ErrorKind::StorageFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_classify_as_invalid_input() {
        assert_eq!(
            DomainError::InvalidStatus("teleported".into()).kind(),
            ErrorKind::InvalidInput
        );
        let illegal = DomainError::IllegalTransition {
            from: "delivered".into(),
            to: "new".into(),
        };
        assert_eq!(illegal.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn insufficient_stock_message_names_the_product() {
        let err = DomainError::insufficient_stock("Smartphone X");
        assert_eq!(err.kind().as_str(), "insufficient_stock");
        assert!(err.to_string().contains("Smartphone X"));
    }

    #[test]
    fn kinds_serialize_as_snake_case_codes() {
        let json = serde_json::to_string(&ErrorKind::StorageFailure).unwrap();
        assert_eq!(json, "\"storage_failure\"");
    }
}
