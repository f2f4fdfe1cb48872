//! Receipt filters: composable predicates over the receipt collection.
//!
//! A [`ReceiptFilter`] is a conjunction. Adding a predicate only ever
//! narrows the matching set, and two filters combine with [`ReceiptFilter::and`].
//! Conflicting predicates (inbox and sentbox, say) simply match nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::notification::{Notification, NotificationKind};
use crate::receipt::{MailboxType, Receipt};
use crate::receiver::Receiver;
use crate::types::{ConversationId, NotificationId, ReceiptId};

/// A single query predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Predicate {
    /// Restrict to explicit receipt ids.
    Ids(BTreeSet<ReceiptId>),
    Recipient(Receiver),
    /// Inner-join semantics: a receipt whose notification is missing matches no kind.
    NotificationKind(NotificationKind),
    Notification(NotificationId),
    /// Receipts of messages in the conversation.
    Conversation(ConversationId),
    Folder(MailboxType),
    Trashed(bool),
    Deleted(bool),
    Read(bool),
    Pinned(bool),
}

impl Predicate {
    /// Whether this predicate needs the receipt's notification to evaluate.
    pub fn needs_notification(&self) -> bool {
        matches!(self, Self::NotificationKind(_) | Self::Conversation(_))
    }

    pub fn matches(&self, receipt: &Receipt, notification: Option<&Notification>) -> bool {
        match self {
            Self::Ids(ids) => ids.contains(&receipt.id),
            Self::Recipient(receiver) => receipt.receiver == *receiver,
            Self::NotificationKind(kind) => notification.is_some_and(|n| n.kind() == *kind),
            Self::Notification(id) => receipt.notification_id == *id,
            Self::Conversation(id) => {
                notification.is_some_and(|n| n.conversation_id() == Some(*id))
            }
            Self::Folder(folder) => receipt.mailbox_type == *folder,
            Self::Trashed(trashed) => receipt.trashed == *trashed,
            Self::Deleted(deleted) => receipt.deleted == *deleted,
            Self::Read(is_read) => receipt.is_read == *is_read,
            Self::Pinned(is_pinned) => receipt.is_pinned == *is_pinned,
        }
    }
}

/// A conjunction of predicates. The empty filter matches every receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptFilter {
    predicates: Vec<Predicate>,
}

impl ReceiptFilter {
    /// A filter matching all receipts.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter matching exactly the given ids.
    pub fn ids(ids: impl IntoIterator<Item = ReceiptId>) -> Self {
        Self::all().with(Predicate::Ids(ids.into_iter().collect()))
    }

    /// A filter matching one receipt.
    pub fn id(id: ReceiptId) -> Self {
        Self::ids([id])
    }

    /// Add a predicate.
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Intersect with another filter.
    pub fn and(mut self, other: ReceiptFilter) -> Self {
        self.predicates.extend(other.predicates);
        self
    }

    pub fn recipient(self, receiver: Receiver) -> Self {
        self.with(Predicate::Recipient(receiver))
    }

    pub fn notification_kind(self, kind: NotificationKind) -> Self {
        self.with(Predicate::NotificationKind(kind))
    }

    /// Receipts of plain notifications.
    pub fn notifications_receipts(self) -> Self {
        self.notification_kind(NotificationKind::Notification)
    }

    /// Receipts of messages.
    pub fn messages_receipts(self) -> Self {
        self.notification_kind(NotificationKind::Message)
    }

    pub fn notification(self, id: NotificationId) -> Self {
        self.with(Predicate::Notification(id))
    }

    pub fn conversation(self, id: ConversationId) -> Self {
        self.with(Predicate::Conversation(id))
    }

    pub fn folder(self, folder: MailboxType) -> Self {
        self.with(Predicate::Folder(folder))
    }

    pub fn inbox(self) -> Self {
        self.folder(MailboxType::Inbox)
    }

    pub fn sentbox(self) -> Self {
        self.folder(MailboxType::Sentbox)
    }

    pub fn archive(self) -> Self {
        self.folder(MailboxType::Archive)
    }

    pub fn archived(self) -> Self {
        self.folder(MailboxType::Archived)
    }

    pub fn trashed(self, trashed: bool) -> Self {
        self.with(Predicate::Trashed(trashed))
    }

    pub fn not_trash(self) -> Self {
        self.trashed(false)
    }

    /// The trash view: trashed and not deleted.
    pub fn trash(self) -> Self {
        self.trashed(true).deleted(false)
    }

    pub fn deleted(self, deleted: bool) -> Self {
        self.with(Predicate::Deleted(deleted))
    }

    pub fn not_deleted(self) -> Self {
        self.deleted(false)
    }

    pub fn read(self, is_read: bool) -> Self {
        self.with(Predicate::Read(is_read))
    }

    pub fn unread(self) -> Self {
        self.read(false)
    }

    pub fn pinned(self, is_pinned: bool) -> Self {
        self.with(Predicate::Pinned(is_pinned))
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Whether any predicate needs the receipt's notification.
    pub fn needs_notification(&self) -> bool {
        self.predicates.iter().any(Predicate::needs_notification)
    }

    /// Evaluate against a receipt and its notification (if it exists).
    pub fn matches(&self, receipt: &Receipt, notification: Option<&Notification>) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(receipt, notification))
    }
}

impl From<Predicate> for ReceiptFilter {
    fn from(predicate: Predicate) -> Self {
        Self::all().with(predicate)
    }
}

/// Per-receiver folder listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailboxView {
    Inbox,
    Sentbox,
    Archive,
    Trash,
}

impl MailboxView {
    /// The filter behind this view for `receiver`.
    pub fn filter(self, receiver: Receiver) -> ReceiptFilter {
        let base = ReceiptFilter::all().recipient(receiver);
        match self {
            Self::Inbox => base.inbox().not_trash().not_deleted(),
            Self::Sentbox => base.sentbox().not_trash().not_deleted(),
            Self::Archive => base.archive().not_trash().not_deleted(),
            Self::Trash => base.trash(),
        }
    }
}
