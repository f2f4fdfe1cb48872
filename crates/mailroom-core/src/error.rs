//! Error types for Mailroom Core.

use thiserror::Error;

/// Core errors that can occur while decoding stored values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown mailbox type: {0}")]
    UnknownMailboxType(String),

    #[error("unknown notification kind: {0}")]
    UnknownNotificationKind(String),

    #[error("message notification without conversation")]
    MessageWithoutConversation,
}

/// Validation errors raised before a receipt is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("receiver is required")]
    MissingReceiver,

    #[error("unknown receiver type: {0}")]
    UnknownReceiverType(String),

    #[error("receiver type already registered: {0}")]
    DuplicateReceiverType(String),

    #[error("receiver kind {code} already registered as {existing}")]
    DuplicateReceiverKind { code: u16, existing: String },
}
