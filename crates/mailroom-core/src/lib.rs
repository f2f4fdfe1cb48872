//! # Mailroom Core
//!
//! Pure primitives for Mailroom: receipts, receivers, notifications,
//! filters and transitions.
//!
//! This crate contains no I/O and no storage. It describes the receipt state
//! machine; `mailroom-store` persists it.
//!
//! ## Key Types
//!
//! - [`Receipt`] - One delivery of one notification to one receiver
//! - [`Receiver`] - Tagged (kind, id) reference, resolved by [`ReceiverRegistry`]
//! - [`Notification`] - Plain notification or conversation-bound message
//! - [`ReceiptFilter`] - Conjunction of query predicates
//! - [`Transition`] - Named state transition, reduced to a [`ReceiptUpdate`]

pub mod error;
pub mod filter;
pub mod notification;
pub mod receipt;
pub mod receiver;
pub mod transition;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use filter::{MailboxView, Predicate, ReceiptFilter};
pub use notification::{
    Conversation, NewNotification, Notification, NotificationKind, NotificationVariant,
};
pub use receipt::{MailboxType, NewReceipt, Receipt, ReceiptBuilder};
pub use receiver::{Messageable, Receiver, ReceiverKind, ReceiverRegistry};
pub use transition::{ReceiptUpdate, Transition};
pub use types::{ConversationId, NotificationId, ReceiptId};
pub use validation::{validate_new_receipt, validate_new_receipts};
