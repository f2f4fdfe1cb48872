//! The Mailbox: unified API over receipt storage.
//!
//! The Mailbox brings together storage, configuration and the optional
//! search hook into one interface for messaging services.

use std::collections::HashMap;
use std::sync::Arc;

use mailroom_core::{
    Conversation, MailboxType, MailboxView, NewReceipt, Notification, NotificationId, Receipt,
    ReceiptBuilder, ReceiptFilter, ReceiptId, Receiver, Transition,
};
use mailroom_store::{now_millis, Store, StoreExt};

use crate::config::MailboxConfig;
use crate::error::{MailboxError, Result};
use crate::search::{SearchDocument, SearchIndex};

/// The main Mailbox struct.
///
/// Provides a unified API for:
/// - Delivering notifications to receivers
/// - Querying receipts by filter or folder view
/// - Applying transitions to one receipt or a filtered set
/// - Resolving a receipt's conversation
pub struct Mailbox<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: MailboxConfig,
    /// External full-text index, used when `config.search_enabled`.
    index: Option<Arc<dyn SearchIndex>>,
}

impl<S: Store> Mailbox<S> {
    /// Create a new mailbox over `store`.
    pub fn new(store: S, config: MailboxConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            index: None,
        }
    }

    /// Attach a search index.
    pub fn with_search_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &MailboxConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Delivery
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a single receipt.
    pub async fn create_receipt(&self, receipt: NewReceipt) -> Result<Receipt> {
        let stored = self.store.insert_receipt(&receipt).await?;
        self.reindex(std::slice::from_ref(&stored)).await?;
        Ok(stored)
    }

    /// Deliver a notification.
    ///
    /// Every recipient gets an unread inbox receipt. The sender, if given,
    /// gets a sentbox receipt. All receipts are created in one transaction.
    pub async fn deliver(
        &self,
        notification_id: NotificationId,
        recipients: &[Receiver],
        sender: Option<Receiver>,
    ) -> Result<Vec<Receipt>> {
        let mut receipts: Vec<NewReceipt> = recipients
            .iter()
            .map(|receiver| {
                ReceiptBuilder::new(notification_id)
                    .receiver(*receiver)
                    .mailbox(MailboxType::Inbox)
                    .build_unchecked()
            })
            .collect();

        if let Some(sender) = sender {
            receipts.push(
                ReceiptBuilder::new(notification_id)
                    .receiver(sender)
                    .mailbox(MailboxType::Sentbox)
                    .read(self.config.sender_copy_read)
                    .build_unchecked(),
            );
        }

        if receipts.is_empty() {
            return Ok(Vec::new());
        }

        let stored = self.store.insert_receipts(&receipts).await?;
        tracing::debug!(
            notification_id = %notification_id,
            receipts = stored.len(),
            "delivered notification"
        );
        self.reindex(&stored).await?;
        Ok(stored)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a receipt by id.
    pub async fn receipt(&self, id: ReceiptId) -> Result<Option<Receipt>> {
        Ok(self.store.get_receipt(id).await?)
    }

    /// Get all receipts matching `filter`, ordered by id.
    pub async fn find(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>> {
        Ok(self.store.find_receipts(filter).await?)
    }

    /// Count receipts matching `filter`.
    pub async fn count(&self, filter: &ReceiptFilter) -> Result<usize> {
        Ok(self.store.count_receipts(filter).await?)
    }

    /// List one folder view for a receiver.
    pub async fn view(&self, receiver: Receiver, view: MailboxView) -> Result<Vec<Receipt>> {
        self.find(&view.filter(receiver)).await
    }

    /// Number of unread receipts in the receiver's inbox view.
    pub async fn unread_count(&self, receiver: Receiver) -> Result<usize> {
        self.count(&MailboxView::Inbox.filter(receiver).unread()).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a transition to one receipt and persist it immediately.
    ///
    /// On success `receipt` is replaced with the stored row, so fields that
    /// changed in storage since it was loaded are picked up as well.
    pub async fn apply(&self, receipt: &mut Receipt, transition: Transition) -> Result<()> {
        let updated = self
            .store
            .transition(&ReceiptFilter::id(receipt.id), transition, now_millis())
            .await?;
        if updated.is_empty() {
            return Err(MailboxError::ReceiptNotFound(receipt.id));
        }

        *receipt = self
            .store
            .get_receipt(receipt.id)
            .await?
            .ok_or(MailboxError::ReceiptNotFound(receipt.id))?;
        tracing::debug!(receipt_id = %receipt.id, %transition, "applied transition");
        self.reindex(std::slice::from_ref(receipt)).await
    }

    /// Apply a transition to every receipt matching `filter`.
    ///
    /// Returns the number of receipts updated; zero means nothing was written.
    pub async fn apply_matching(
        &self,
        filter: &ReceiptFilter,
        transition: Transition,
    ) -> Result<usize> {
        let updated = self
            .store
            .transition(filter, transition, now_millis())
            .await?;
        tracing::debug!(count = updated.len(), %transition, "applied bulk transition");

        if !updated.is_empty() && self.indexing() {
            let receipts = self
                .store
                .find_receipts(&ReceiptFilter::ids(updated.iter().copied()))
                .await?;
            self.reindex(&receipts).await?;
        }
        Ok(updated.len())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// The conversation of a receipt, present only if its notification is a message.
    pub async fn conversation(&self, receipt: &Receipt) -> Result<Option<Conversation>> {
        let Some(notification) = self.store.get_notification(receipt.notification_id).await?
        else {
            return Ok(None);
        };
        match notification.conversation_id() {
            Some(conversation_id) => Ok(self.store.get_conversation(conversation_id).await?),
            None => Ok(None),
        }
    }

    /// The search fields of a receipt.
    pub async fn search_document(&self, receipt: &Receipt) -> Result<SearchDocument> {
        let notification = self.store.get_notification(receipt.notification_id).await?;
        Ok(SearchDocument::new(receipt, notification.as_ref()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search Indexing
    // ─────────────────────────────────────────────────────────────────────────

    fn indexing(&self) -> bool {
        self.config.search_enabled && self.index.is_some()
    }

    /// Send documents for `receipts` to the search index, if enabled.
    async fn reindex(&self, receipts: &[Receipt]) -> Result<()> {
        let Some(index) = self.index.as_ref().filter(|_| self.config.search_enabled) else {
            return Ok(());
        };
        if receipts.is_empty() {
            return Ok(());
        }

        let mut notifications: HashMap<NotificationId, Option<Notification>> = HashMap::new();
        let mut documents = Vec::with_capacity(receipts.len());
        for receipt in receipts {
            if !notifications.contains_key(&receipt.notification_id) {
                let notification = self.store.get_notification(receipt.notification_id).await?;
                notifications.insert(receipt.notification_id, notification);
            }
            let notification = notifications
                .get(&receipt.notification_id)
                .and_then(Option::as_ref);
            documents.push(SearchDocument::new(receipt, notification));
        }

        index.index(&documents).await.map_err(|e| {
            tracing::warn!(documents = documents.len(), "search indexing failed: {}", e);
            MailboxError::Indexing(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailroom_core::{NewNotification, ReceiverKind, ValidationError};
    use mailroom_store::MemoryStore;

    fn user(id: i64) -> Receiver {
        Receiver::new(ReceiverKind(1), id)
    }

    fn mailbox() -> Mailbox<MemoryStore> {
        Mailbox::new(MemoryStore::new(), MailboxConfig::default())
    }

    #[tokio::test]
    async fn test_create_requires_receiver() {
        let mailbox = mailbox();
        let new = ReceiptBuilder::new(NotificationId::new(1)).build_unchecked();
        let err = mailbox.create_receipt(new).await.unwrap_err();
        assert!(matches!(
            err,
            MailboxError::Validation(ValidationError::MissingReceiver)
        ));
    }

    #[tokio::test]
    async fn test_deliver_creates_inbox_and_sentbox() {
        let mailbox = mailbox();
        let receipts = mailbox
            .deliver(NotificationId::new(1), &[user(2), user(3)], Some(user(1)))
            .await
            .unwrap();

        assert_eq!(receipts.len(), 3);
        assert_eq!(mailbox.view(user(2), MailboxView::Inbox).await.unwrap().len(), 1);
        let sent = mailbox.view(user(1), MailboxView::Sentbox).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].is_read);
        assert_eq!(mailbox.unread_count(user(3)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deliver_to_nobody_is_noop() {
        let mailbox = mailbox();
        let receipts = mailbox.deliver(NotificationId::new(1), &[], None).await.unwrap();
        assert!(receipts.is_empty());
    }

    #[tokio::test]
    async fn test_apply_updates_record_and_store() {
        let mailbox = mailbox();
        let mut receipt = mailbox
            .create_receipt(
                ReceiptBuilder::new(NotificationId::new(1))
                    .receiver(user(7))
                    .trashed(true)
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();

        mailbox.apply(&mut receipt, Transition::MoveToInbox).await.unwrap();
        assert!(!receipt.trashed);

        let stored = mailbox.receipt(receipt.id).await.unwrap().unwrap();
        assert_eq!(stored, receipt);
    }

    #[tokio::test]
    async fn test_apply_refreshes_stale_copy() {
        let mailbox = mailbox();
        let receipts = mailbox
            .deliver(NotificationId::new(1), &[user(7)], None)
            .await
            .unwrap();
        let mut stale = receipts[0].clone();

        mailbox
            .apply_matching(&ReceiptFilter::all().recipient(user(7)), Transition::MoveToTrash)
            .await
            .unwrap();
        mailbox.apply(&mut stale, Transition::MarkAsDeleted).await.unwrap();

        assert!(stale.trashed);
        assert!(stale.deleted);
        assert_eq!(mailbox.receipt(stale.id).await.unwrap().unwrap(), stale);
    }

    #[tokio::test]
    async fn test_apply_to_missing_receipt() {
        let mailbox = mailbox();
        let mut ghost = ReceiptBuilder::new(NotificationId::new(1))
            .receiver(user(7))
            .build_unchecked()
            .into_receipt(ReceiptId::new(99), 0)
            .unwrap();
        let err = mailbox.apply(&mut ghost, Transition::MarkAsRead).await.unwrap_err();
        assert!(matches!(err, MailboxError::ReceiptNotFound(id) if id == ReceiptId::new(99)));
        assert!(!ghost.is_read);
    }

    #[tokio::test]
    async fn test_conversation_only_for_messages() {
        let mailbox = mailbox();
        let conversation = mailbox.store().insert_conversation("hi").await.unwrap();
        let message = mailbox
            .store()
            .insert_notification(&NewNotification::message(conversation.id, "hi", "there"))
            .await
            .unwrap();
        let plain = mailbox
            .store()
            .insert_notification(&NewNotification::plain("system", "maintenance"))
            .await
            .unwrap();

        let receipts = mailbox.deliver(message.id, &[user(1)], None).await.unwrap();
        let found = mailbox.conversation(&receipts[0]).await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(conversation.id));

        let receipts = mailbox.deliver(plain.id, &[user(1)], None).await.unwrap();
        assert!(mailbox.conversation(&receipts[0]).await.unwrap().is_none());
    }
}
