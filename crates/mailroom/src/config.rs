//! Mailbox configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Mailbox.
///
/// Deserializes with defaults for missing keys, so an empty document is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    /// Hand updated receipts to the search index after each write.
    pub search_enabled: bool,
    /// Mark the sender's sentbox copy as read on delivery.
    pub sender_copy_read: bool,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            search_enabled: false,
            sender_copy_read: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: MailboxConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MailboxConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config: MailboxConfig = serde_json::from_str(r#"{"search_enabled": true}"#).unwrap();
        assert!(config.search_enabled);
        assert!(config.sender_copy_read);
    }
}
