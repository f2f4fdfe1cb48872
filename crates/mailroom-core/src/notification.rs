//! Notifications, messages and conversations.
//!
//! These are owned by the upstream messaging subsystem. Receipt logic only
//! reads two facts from them: whether a notification is a message, and which
//! conversation that message belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{ConversationId, NotificationId};

/// Which kind of notification a receipt points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A plain notification with no specialized subtype.
    Notification,
    /// A conversation-bound message.
    Message,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notification" => Ok(Self::Notification),
            "message" => Ok(Self::Message),
            other => Err(CoreError::UnknownNotificationKind(other.to_string())),
        }
    }
}

/// Variant-specific notification data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationVariant {
    Plain,
    Message { conversation_id: ConversationId },
}

impl NotificationVariant {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::Plain => NotificationKind::Notification,
            Self::Message { .. } => NotificationKind::Message,
        }
    }

    /// The owning conversation, only for messages.
    pub fn conversation_id(&self) -> Option<ConversationId> {
        match self {
            Self::Plain => None,
            Self::Message { conversation_id } => Some(*conversation_id),
        }
    }

    /// Rebuild from a stored kind and nullable conversation column.
    pub fn from_parts(
        kind: NotificationKind,
        conversation_id: Option<ConversationId>,
    ) -> Result<Self, CoreError> {
        match kind {
            NotificationKind::Notification => Ok(Self::Plain),
            NotificationKind::Message => conversation_id
                .map(|conversation_id| Self::Message { conversation_id })
                .ok_or(CoreError::MessageWithoutConversation),
        }
    }
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub subject: String,
    pub body: String,
    pub variant: NotificationVariant,
    /// Creation time (Unix ms).
    pub created_at: i64,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        self.variant.kind()
    }

    pub fn is_message(&self) -> bool {
        matches!(self.variant, NotificationVariant::Message { .. })
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.variant.conversation_id()
    }
}

/// A notification that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub subject: String,
    pub body: String,
    pub variant: NotificationVariant,
}

impl NewNotification {
    /// A plain notification.
    pub fn plain(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            variant: NotificationVariant::Plain,
        }
    }

    /// A message in `conversation_id`.
    pub fn message(
        conversation_id: ConversationId,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            variant: NotificationVariant::Message { conversation_id },
        }
    }
}

/// A thread grouping related messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub subject: String,
    /// Creation time (Unix ms).
    pub created_at: i64,
}
