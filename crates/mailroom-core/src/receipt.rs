//! Receipt: one delivery of one notification to one receiver.
//!
//! The receiver and notification are fixed at creation. Everything else is
//! per-recipient state that only changes through a [`Transition`].
//!
//! [`Transition`]: crate::transition::Transition

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, ValidationError};
use crate::receiver::Receiver;
use crate::types::{NotificationId, ReceiptId};
use crate::validation::validate_new_receipt;

/// The folder a receipt currently resides in.
///
/// Trash is not a folder: it is the `trashed` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailboxType {
    Inbox,
    Sentbox,
    Archive,
    /// Legacy spelling of `Archive`. Still stored and queried as its own value.
    Archived,
}

impl MailboxType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Sentbox => "sentbox",
            Self::Archive => "archive",
            Self::Archived => "archived",
        }
    }

    /// True for both archive spellings.
    pub fn is_archive(self) -> bool {
        matches!(self, Self::Archive | Self::Archived)
    }
}

impl fmt::Display for MailboxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MailboxType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(Self::Inbox),
            "sentbox" => Ok(Self::Sentbox),
            "archive" => Ok(Self::Archive),
            "archived" => Ok(Self::Archived),
            other => Err(CoreError::UnknownMailboxType(other.to_string())),
        }
    }
}

/// A stored receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub notification_id: NotificationId,
    pub receiver: Receiver,
    pub mailbox_type: MailboxType,
    pub is_read: bool,
    pub is_pinned: bool,
    pub trashed: bool,
    pub deleted: bool,
    /// Creation time (Unix ms).
    pub created_at: i64,
    /// Time of the last transition (Unix ms).
    pub updated_at: i64,
}

impl Receipt {
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    pub fn is_trashed(&self) -> bool {
        self.trashed
    }

    /// Whether the receipt shows up in the trash view.
    pub fn is_in_trash(&self) -> bool {
        self.trashed && !self.deleted
    }
}

/// A validated receipt that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReceipt {
    pub notification_id: NotificationId,
    pub receiver: Option<Receiver>,
    pub mailbox_type: MailboxType,
    pub is_read: bool,
    pub is_pinned: bool,
    pub trashed: bool,
    pub deleted: bool,
}

impl NewReceipt {
    /// Materialize into a stored receipt with the given id and timestamp.
    ///
    /// Fails if the receiver is missing.
    pub fn into_receipt(self, id: ReceiptId, now: i64) -> Result<Receipt, ValidationError> {
        let receiver = self.receiver.ok_or(ValidationError::MissingReceiver)?;
        Ok(Receipt {
            id,
            notification_id: self.notification_id,
            receiver,
            mailbox_type: self.mailbox_type,
            is_read: self.is_read,
            is_pinned: self.is_pinned,
            trashed: self.trashed,
            deleted: self.deleted,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Builder for [`NewReceipt`].
#[derive(Debug, Clone)]
pub struct ReceiptBuilder {
    inner: NewReceipt,
}

impl ReceiptBuilder {
    /// Start a receipt for `notification_id`, defaulting to an unread inbox entry.
    pub fn new(notification_id: NotificationId) -> Self {
        Self {
            inner: NewReceipt {
                notification_id,
                receiver: None,
                mailbox_type: MailboxType::Inbox,
                is_read: false,
                is_pinned: false,
                trashed: false,
                deleted: false,
            },
        }
    }

    pub fn receiver(mut self, receiver: Receiver) -> Self {
        self.inner.receiver = Some(receiver);
        self
    }

    pub fn mailbox(mut self, mailbox_type: MailboxType) -> Self {
        self.inner.mailbox_type = mailbox_type;
        self
    }

    pub fn read(mut self, is_read: bool) -> Self {
        self.inner.is_read = is_read;
        self
    }

    pub fn pinned(mut self, is_pinned: bool) -> Self {
        self.inner.is_pinned = is_pinned;
        self
    }

    pub fn trashed(mut self, trashed: bool) -> Self {
        self.inner.trashed = trashed;
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.inner.deleted = deleted;
        self
    }

    /// Build without validating. Stores validate again on insert.
    pub fn build_unchecked(self) -> NewReceipt {
        self.inner
    }

    /// Build and validate.
    pub fn build(self) -> Result<NewReceipt, ValidationError> {
        validate_new_receipt(&self.inner)?;
        Ok(self.inner)
    }
}
