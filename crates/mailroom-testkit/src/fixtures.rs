//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use mailroom::{Mailbox, MailboxConfig, SearchIndex};
use mailroom_core::{
    Conversation, MailboxType, NewNotification, Notification, NotificationId, Receipt,
    ReceiptBuilder, Receiver, ReceiverRegistry,
};
use mailroom_store::{MemoryStore, Store, StoreExt};

/// Stored code of the `User` receiver kind.
pub const USER_KIND: u16 = 1;
/// Stored code of the `Group` receiver kind.
pub const GROUP_KIND: u16 = 2;

/// A test fixture with a receiver registry and memory store.
///
/// The registry knows `User` and `Group`, with `Admin` as a subtype of `User`.
pub struct TestFixture {
    pub registry: ReceiverRegistry,
    pub store: MemoryStore,
}

impl TestFixture {
    pub fn new() -> Self {
        let mut registry = ReceiverRegistry::new();
        let user = registry
            .register("User", USER_KIND)
            .expect("fresh registry");
        registry
            .register("Group", GROUP_KIND)
            .expect("fresh registry");
        registry
            .register_subtype("Admin", user)
            .expect("User is registered");
        Self {
            registry,
            store: MemoryStore::new(),
        }
    }

    pub fn user(&self, id: i64) -> Receiver {
        self.registry.receiver("User", id).expect("User is registered")
    }

    pub fn group(&self, id: i64) -> Receiver {
        self.registry.receiver("Group", id).expect("Group is registered")
    }

    /// An admin resolves to the same receiver kind as a user.
    pub fn admin(&self, id: i64) -> Receiver {
        self.registry.receiver("Admin", id).expect("Admin is registered")
    }

    /// Create a conversation and its first message.
    pub async fn message(&self, subject: &str, body: &str) -> (Conversation, Notification) {
        let conversation = self
            .store
            .insert_conversation(subject)
            .await
            .expect("insert conversation");
        let message = self
            .store
            .insert_notification(&NewNotification::message(conversation.id, subject, body))
            .await
            .expect("insert message");
        (conversation, message)
    }

    /// Create a notification that is not a message.
    pub async fn notification(&self, subject: &str, body: &str) -> Notification {
        self.store
            .insert_notification(&NewNotification::plain(subject, body))
            .await
            .expect("insert notification")
    }

    /// Create an unread inbox receipt.
    pub async fn receipt(&self, notification_id: NotificationId, receiver: Receiver) -> Receipt {
        self.receipt_in(notification_id, receiver, MailboxType::Inbox)
            .await
    }

    pub async fn receipt_in(
        &self,
        notification_id: NotificationId,
        receiver: Receiver,
        mailbox_type: MailboxType,
    ) -> Receipt {
        let new = ReceiptBuilder::new(notification_id)
            .receiver(receiver)
            .mailbox(mailbox_type)
            .build()
            .expect("receiver is set");
        self.store.insert_receipt(&new).await.expect("insert receipt")
    }

    /// Turn the fixture into a mailbox over its store.
    pub fn into_mailbox(self, config: MailboxConfig) -> Mailbox<MemoryStore> {
        Mailbox::new(self.store, config)
    }

    /// Turn the fixture into a mailbox that indexes into `index`.
    pub fn into_indexed_mailbox(self, index: Arc<dyn SearchIndex>) -> Mailbox<MemoryStore> {
        let config = MailboxConfig {
            search_enabled: true,
            ..MailboxConfig::default()
        };
        Mailbox::new(self.store, config).with_search_index(index)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
