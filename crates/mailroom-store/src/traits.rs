//! Store trait: the abstract interface for receipt persistence.
//!
//! This trait keeps the mailbox storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use mailroom_core::{
    Conversation, ConversationId, NewNotification, NewReceipt, Notification, NotificationId,
    Receipt, ReceiptFilter, ReceiptId, ReceiptUpdate, Transition,
};

use crate::error::{Result, StoreError};

/// The Store trait: async interface for receipt persistence.
///
/// # Design Notes
///
/// - **Validated inserts**: receipts without a receiver are rejected with
///   [`StoreError::Validation`] and nothing is written.
/// - **One update path**: single-receipt and bulk transitions both go through
///   [`Store::update_receipts`]; a single receipt is just an id filter.
/// - **Atomic bulk updates**: the matching id set is computed and updated
///   inside one transaction (or one write lock). An empty match writes nothing.
/// - **Soft delete only**: there is no way to remove a receipt.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Upstream records (conversations and notifications)
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a conversation.
    async fn insert_conversation(&self, subject: &str) -> Result<Conversation>;

    /// Get a conversation by id.
    async fn get_conversation(&self, id: ConversationId) -> Result<Option<Conversation>>;

    /// Create a notification or message.
    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification>;

    /// Get a notification by id.
    async fn get_notification(&self, id: NotificationId) -> Result<Option<Notification>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Receipt Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert receipts in one transaction.
    ///
    /// Returns the stored receipts in input order. If any receipt fails
    /// validation, none are stored.
    async fn insert_receipts(&self, receipts: &[NewReceipt]) -> Result<Vec<Receipt>>;

    /// Get a receipt by id.
    async fn get_receipt(&self, id: ReceiptId) -> Result<Option<Receipt>>;

    /// Get all receipts matching the filter, ordered by id.
    async fn find_receipts(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>>;

    /// Count receipts matching the filter.
    async fn count_receipts(&self, filter: &ReceiptFilter) -> Result<usize>;

    /// Apply `update` to every receipt matching `filter`, stamping `updated_at = now`.
    ///
    /// Returns the ids that were updated, ordered by id. An empty result means
    /// no write happened.
    async fn update_receipts(
        &self,
        filter: &ReceiptFilter,
        update: &ReceiptUpdate,
        now: i64,
    ) -> Result<Vec<ReceiptId>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Insert a single receipt.
    fn insert_receipt(
        &self,
        receipt: &NewReceipt,
    ) -> impl std::future::Future<Output = Result<Receipt>> + Send;

    /// Apply a named transition to every receipt matching `filter`.
    fn transition(
        &self,
        filter: &ReceiptFilter,
        transition: Transition,
        now: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ReceiptId>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn insert_receipt(&self, receipt: &NewReceipt) -> Result<Receipt> {
        let mut stored = self.insert_receipts(std::slice::from_ref(receipt)).await?;
        stored
            .pop()
            .ok_or_else(|| StoreError::Inconsistent("insert returned no receipt".into()))
    }

    async fn transition(
        &self,
        filter: &ReceiptFilter,
        transition: Transition,
        now: i64,
    ) -> Result<Vec<ReceiptId>> {
        let update = transition.update();
        self.update_receipts(filter, &update, now).await
    }
}
