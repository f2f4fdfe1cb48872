//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use mailroom_core::{
    validate_new_receipts, Conversation, ConversationId, NewNotification, NewReceipt,
    Notification, NotificationId, Receipt, ReceiptFilter, ReceiptId, ReceiptUpdate,
};

use crate::error::{Result, StoreError};
use crate::now_millis;
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Conversations indexed by id.
    conversations: BTreeMap<ConversationId, Conversation>,

    /// Notifications indexed by id.
    notifications: BTreeMap<NotificationId, Notification>,

    /// Receipts indexed by id (iteration order is id order).
    receipts: BTreeMap<ReceiptId, Receipt>,

    /// Last assigned id per table.
    last_conversation_id: i64,
    last_notification_id: i64,
    last_receipt_id: i64,
}

impl MemoryStoreInner {
    fn matching_ids(&self, filter: &ReceiptFilter) -> Vec<ReceiptId> {
        let needs_notification = filter.needs_notification();
        self.receipts
            .values()
            .filter(|receipt| {
                let notification = if needs_notification {
                    self.notifications.get(&receipt.notification_id)
                } else {
                    None
                };
                filter.matches(receipt, notification)
            })
            .map(|receipt| receipt.id)
            .collect()
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_conversation(&self, subject: &str) -> Result<Conversation> {
        let mut inner = self.write()?;
        inner.last_conversation_id += 1;

        let conversation = Conversation {
            id: ConversationId::new(inner.last_conversation_id),
            subject: subject.to_string(),
            created_at: now_millis(),
        };
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(&self, id: ConversationId) -> Result<Option<Conversation>> {
        let inner = self.read()?;
        Ok(inner.conversations.get(&id).cloned())
    }

    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification> {
        let mut inner = self.write()?;
        inner.last_notification_id += 1;

        let stored = Notification {
            id: NotificationId::new(inner.last_notification_id),
            subject: notification.subject.clone(),
            body: notification.body.clone(),
            variant: notification.variant,
            created_at: now_millis(),
        };
        inner.notifications.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_notification(&self, id: NotificationId) -> Result<Option<Notification>> {
        let inner = self.read()?;
        Ok(inner.notifications.get(&id).cloned())
    }

    async fn insert_receipts(&self, receipts: &[NewReceipt]) -> Result<Vec<Receipt>> {
        validate_new_receipts(receipts)?;

        let mut inner = self.write()?;
        let now = now_millis();

        // Materialize everything before touching the map so a failure stores nothing.
        let mut next_id = inner.last_receipt_id;
        let stored = receipts
            .iter()
            .map(|new| {
                next_id += 1;
                new.clone().into_receipt(ReceiptId::new(next_id), now)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        inner.last_receipt_id = next_id;
        for receipt in &stored {
            inner.receipts.insert(receipt.id, receipt.clone());
        }

        tracing::debug!(count = stored.len(), "inserted receipts");
        Ok(stored)
    }

    async fn get_receipt(&self, id: ReceiptId) -> Result<Option<Receipt>> {
        let inner = self.read()?;
        Ok(inner.receipts.get(&id).cloned())
    }

    async fn find_receipts(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>> {
        let inner = self.read()?;
        Ok(inner
            .matching_ids(filter)
            .into_iter()
            .filter_map(|id| inner.receipts.get(&id).cloned())
            .collect())
    }

    async fn count_receipts(&self, filter: &ReceiptFilter) -> Result<usize> {
        let inner = self.read()?;
        Ok(inner.matching_ids(filter).len())
    }

    async fn update_receipts(
        &self,
        filter: &ReceiptFilter,
        update: &ReceiptUpdate,
        now: i64,
    ) -> Result<Vec<ReceiptId>> {
        if update.is_empty() {
            return Ok(Vec::new());
        }

        // Select and update under one write lock.
        let mut inner = self.write()?;
        let ids = inner.matching_ids(filter);

        for id in &ids {
            if let Some(receipt) = inner.receipts.get_mut(id) {
                update.apply_to(receipt, now);
            }
        }

        if !ids.is_empty() {
            tracing::debug!(count = ids.len(), "updated receipts");
        }
        Ok(ids)
    }
}
