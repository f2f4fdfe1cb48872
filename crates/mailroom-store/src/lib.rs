//! # Mailroom Store
//!
//! Storage abstraction for Mailroom. Provides a trait-based interface for
//! receipt persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts receipt storage behind the [`Store`] trait,
//! allowing the mailbox to be storage-agnostic. The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - Single-receipt insert and named transitions on top of [`Store`]
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mailroom_core::{ReceiptBuilder, ReceiptFilter, Receiver, ReceiverKind, Transition};
//! use mailroom_store::{SqliteStore, Store, StoreExt};
//!
//! async fn example() {
//!     let store = SqliteStore::open("mailroom.db").unwrap();
//!
//!     let conversation = store.insert_conversation("hello").await.unwrap();
//!     // let message = store.insert_notification(...).await.unwrap();
//!     // let receipt = store.insert_receipt(&new_receipt).await.unwrap();
//!
//!     let user = Receiver::new(ReceiverKind(1), 7);
//!     let filter = ReceiptFilter::all().recipient(user).conversation(conversation.id);
//!     store.transition(&filter, Transition::MarkAsRead, 0).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic bulk updates**: id selection and update share one transaction
//! - **Empty matches**: a bulk update that matches nothing writes nothing
//! - **Soft delete**: receipts are never removed, only flagged

pub mod error;
pub mod memory;
pub mod migration;
mod query;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
