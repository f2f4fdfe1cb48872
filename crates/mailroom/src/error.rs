//! Error types for the Mailbox.

use mailroom_core::{ReceiptId, ValidationError};
use mailroom_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Mailbox operations.
#[derive(Debug, Error)]
pub enum MailboxError {
    /// A required relation was missing or unresolvable.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The storage backend failed. Surfaced as-is; nothing is retried.
    #[error("persistence error: {0}")]
    Persistence(#[source] StoreError),

    /// An instance-level transition targeted a receipt that is not stored.
    #[error("receipt not found: {0}")]
    ReceiptNotFound(ReceiptId),

    /// The search index rejected updated documents. The write itself committed.
    #[error("search indexing failed: {0}")]
    Indexing(anyhow::Error),
}

impl From<StoreError> for MailboxError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(v) => MailboxError::Validation(v),
            other => MailboxError::Persistence(other),
        }
    }
}

/// Result type for Mailbox operations.
pub type Result<T> = std::result::Result<T, MailboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_validation_maps_to_validation() {
        let err: MailboxError = StoreError::Validation(ValidationError::MissingReceiver).into();
        assert!(matches!(
            err,
            MailboxError::Validation(ValidationError::MissingReceiver)
        ));
    }

    #[test]
    fn test_store_failure_maps_to_persistence() {
        let err: MailboxError = StoreError::LockPoisoned("writer panicked".into()).into();
        assert!(matches!(err, MailboxError::Persistence(_)));
        assert!(err.to_string().starts_with("persistence error"));
    }
}
