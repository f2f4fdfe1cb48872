//! Search indexing hook.
//!
//! Mailroom does no ranking or tokenization. It derives the indexable fields
//! of a receipt and hands them to a [`SearchIndex`] after every write.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mailroom_core::{Notification, Receipt, ReceiptId, Receiver};

/// Indexed text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Subject,
    Body,
}

impl SearchField {
    /// Relative weight of a match in this field.
    pub fn boost(self) -> u32 {
        match self {
            Self::Subject => 5,
            Self::Body => 1,
        }
    }
}

/// The indexable view of one receipt.
///
/// `subject` and `body` come from the receipt's message and are absent when
/// the notification is not a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub receipt_id: ReceiptId,
    pub receiver: Receiver,
    pub subject: Option<String>,
    pub body: Option<String>,
}

impl SearchDocument {
    pub fn new(receipt: &Receipt, notification: Option<&Notification>) -> Self {
        let message = notification.filter(|n| n.is_message());
        Self {
            receipt_id: receipt.id,
            receiver: receipt.receiver,
            subject: message.map(|m| m.subject.clone()),
            body: message.map(|m| m.body.clone()),
        }
    }

    pub fn field(&self, field: SearchField) -> Option<&str> {
        match field {
            SearchField::Subject => self.subject.as_deref(),
            SearchField::Body => self.body.as_deref(),
        }
    }
}

/// An external full-text index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Add or replace the documents for the given receipts.
    async fn index(&self, documents: &[SearchDocument]) -> anyhow::Result<()>;
}
