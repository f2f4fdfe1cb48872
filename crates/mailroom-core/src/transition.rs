//! Named receipt transitions and the field updates they map to.
//!
//! A transition is applied the same way to a single receipt and to a
//! filtered set: both shapes reduce it to one [`ReceiptUpdate`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::receipt::{MailboxType, Receipt};

/// A named state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    MarkAsRead,
    MarkAsUnread,
    MoveToTrash,
    Untrash,
    MarkAsDeleted,
    MarkAsNotDeleted,
    MarkAsPinned,
    MarkAsUnpinned,
    MoveToInbox,
    MoveToSentbox,
    MoveToArchive,
}

impl Transition {
    /// Every transition, in declaration order.
    pub const ALL: [Transition; 11] = [
        Self::MarkAsRead,
        Self::MarkAsUnread,
        Self::MoveToTrash,
        Self::Untrash,
        Self::MarkAsDeleted,
        Self::MarkAsNotDeleted,
        Self::MarkAsPinned,
        Self::MarkAsUnpinned,
        Self::MoveToInbox,
        Self::MoveToSentbox,
        Self::MoveToArchive,
    ];

    /// The field updates this transition performs.
    pub fn update(self) -> ReceiptUpdate {
        let none = ReceiptUpdate::default();
        match self {
            Self::MarkAsRead => ReceiptUpdate { is_read: Some(true), ..none },
            Self::MarkAsUnread => ReceiptUpdate { is_read: Some(false), ..none },
            Self::MoveToTrash => ReceiptUpdate { trashed: Some(true), ..none },
            Self::Untrash => ReceiptUpdate { trashed: Some(false), ..none },
            Self::MarkAsDeleted => ReceiptUpdate { deleted: Some(true), ..none },
            Self::MarkAsNotDeleted => ReceiptUpdate { deleted: Some(false), ..none },
            Self::MarkAsPinned => ReceiptUpdate { is_pinned: Some(true), ..none },
            Self::MarkAsUnpinned => ReceiptUpdate { is_pinned: Some(false), ..none },
            Self::MoveToInbox => ReceiptUpdate::move_to(MailboxType::Inbox),
            Self::MoveToSentbox => ReceiptUpdate::move_to(MailboxType::Sentbox),
            Self::MoveToArchive => ReceiptUpdate::move_to(MailboxType::Archive),
        }
    }

    /// The transition that undoes this one, for the flag toggles.
    pub fn inverse(self) -> Option<Transition> {
        match self {
            Self::MarkAsRead => Some(Self::MarkAsUnread),
            Self::MarkAsUnread => Some(Self::MarkAsRead),
            Self::MoveToTrash => Some(Self::Untrash),
            Self::Untrash => Some(Self::MoveToTrash),
            Self::MarkAsDeleted => Some(Self::MarkAsNotDeleted),
            Self::MarkAsNotDeleted => Some(Self::MarkAsDeleted),
            Self::MarkAsPinned => Some(Self::MarkAsUnpinned),
            Self::MarkAsUnpinned => Some(Self::MarkAsPinned),
            Self::MoveToInbox | Self::MoveToSentbox | Self::MoveToArchive => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MarkAsRead => "mark_as_read",
            Self::MarkAsUnread => "mark_as_unread",
            Self::MoveToTrash => "move_to_trash",
            Self::Untrash => "untrash",
            Self::MarkAsDeleted => "mark_as_deleted",
            Self::MarkAsNotDeleted => "mark_as_not_deleted",
            Self::MarkAsPinned => "mark_as_pinned",
            Self::MarkAsUnpinned => "mark_as_unpinned",
            Self::MoveToInbox => "move_to_inbox",
            Self::MoveToSentbox => "move_to_sentbox",
            Self::MoveToArchive => "move_to_archive",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of field assignments. `None` leaves the field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptUpdate {
    pub mailbox_type: Option<MailboxType>,
    pub is_read: Option<bool>,
    pub is_pinned: Option<bool>,
    pub trashed: Option<bool>,
    pub deleted: Option<bool>,
}

impl ReceiptUpdate {
    /// Folder move. Moving always takes the receipt out of trash.
    pub fn move_to(mailbox_type: MailboxType) -> Self {
        Self {
            mailbox_type: Some(mailbox_type),
            trashed: Some(false),
            ..Self::default()
        }
    }

    /// True if no field would change.
    pub fn is_empty(&self) -> bool {
        self.mailbox_type.is_none()
            && self.is_read.is_none()
            && self.is_pinned.is_none()
            && self.trashed.is_none()
            && self.deleted.is_none()
    }

    /// Apply to an in-memory receipt, stamping `updated_at`.
    ///
    /// Receiver and notification are never touched.
    pub fn apply_to(&self, receipt: &mut Receipt, now: i64) {
        if let Some(mailbox_type) = self.mailbox_type {
            receipt.mailbox_type = mailbox_type;
        }
        if let Some(is_read) = self.is_read {
            receipt.is_read = is_read;
        }
        if let Some(is_pinned) = self.is_pinned {
            receipt.is_pinned = is_pinned;
        }
        if let Some(trashed) = self.trashed {
            receipt.trashed = trashed;
        }
        if let Some(deleted) = self.deleted {
            receipt.deleted = deleted;
        }
        receipt.updated_at = now;
    }
}
