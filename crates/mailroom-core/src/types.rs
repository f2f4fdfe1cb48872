//! Strong type definitions for Mailroom.
//!
//! All identifiers are newtypes over the store's integer keys to prevent
//! mixing a receipt id with a notification id at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create from a raw store key.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw store key.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

id_type!(
    /// Identifier of a receipt, assigned by the store on creation.
    ReceiptId
);

id_type!(
    /// Identifier of a notification (plain or message).
    NotificationId
);

id_type!(
    /// Identifier of a conversation thread.
    ConversationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(ReceiptId::new(42).to_string(), "42");
    }

    #[test]
    fn test_id_debug() {
        let debug = format!("{:?}", ConversationId::new(7));
        assert_eq!(debug, "ConversationId(7)");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&NotificationId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: NotificationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(), 9);
    }
}
