//! # Mailroom
//!
//! Per-recipient mailbox state for notifications and messages.
//!
//! ## Overview
//!
//! When a notification is delivered, every recipient gets a receipt: its own
//! copy of the notification's mailbox state. Mailroom provides:
//!
//! - **Receipts**: Folder, read, pinned, trashed and deleted flags per recipient
//! - **Filters**: Composable predicates over receipts and their notifications
//! - **Transitions**: Named state changes, for one receipt or a filtered set
//! - **Search hook**: Indexable fields handed to an external full-text index
//!
//! ## Key Concepts
//!
//! - **Receiver**: A polymorphic reference (kind + id) to whoever owns a receipt.
//! - **Message**: A notification that belongs to a conversation.
//! - **Trash**: Trashed but not deleted. Deleted receipts are hidden from every view.
//! - **Folder move**: Any folder move also takes the receipt out of the trash.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mailroom::{Mailbox, MailboxConfig, MailboxView, Transition};
//! use mailroom::core::{NewNotification, ReceiverRegistry};
//! use mailroom::store::{SqliteStore, Store};
//!
//! async fn example() {
//!     let mut registry = ReceiverRegistry::new();
//!     registry.register("User", 1).unwrap();
//!     let alice = registry.receiver("User", 1).unwrap();
//!     let bob = registry.receiver("User", 2).unwrap();
//!
//!     let store = SqliteStore::open("mailroom.db").unwrap();
//!     let conversation = store.insert_conversation("lunch?").await.unwrap();
//!     let message = store
//!         .insert_notification(&NewNotification::message(conversation.id, "lunch?", "noon"))
//!         .await
//!         .unwrap();
//!
//!     let mailbox = Mailbox::new(store, MailboxConfig::default());
//!     let receipts = mailbox.deliver(message.id, &[bob], Some(alice)).await.unwrap();
//!
//!     let mut receipt = receipts[0].clone();
//!     mailbox.apply(&mut receipt, Transition::MarkAsRead).await.unwrap();
//!     let inbox = mailbox.view(bob, MailboxView::Inbox).await.unwrap();
//!     assert!(inbox[0].is_read);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `mailroom::core` - Core types (Receipt, ReceiptFilter, Transition, etc.)
//! - `mailroom::store` - Storage abstraction, SQLite and in-memory backends

pub mod config;
pub mod error;
pub mod mailbox;
pub mod search;

// Re-export component crates
pub use mailroom_core as core;
pub use mailroom_store as store;

// Re-export main types for convenience
pub use config::MailboxConfig;
pub use error::{MailboxError, Result};
pub use mailbox::Mailbox;
pub use search::{SearchDocument, SearchField, SearchIndex};

// Re-export commonly used core types
pub use mailroom_core::{
    Conversation, MailboxType, MailboxView, NewReceipt, Notification, NotificationKind, Receipt,
    ReceiptBuilder, ReceiptFilter, ReceiptId, Receiver, ReceiverRegistry, Transition,
};
