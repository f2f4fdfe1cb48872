//! Receivers: the polymorphic (kind, id) reference a receipt is delivered to.
//!
//! Receiver kinds are not a closed set known to this crate, so callers
//! register them in a [`ReceiverRegistry`]. A subtype registered under a
//! base kind resolves to the base kind, which is what gets stored and
//! queried.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::ValidationError;

/// Discriminant of a registered receiver base kind.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiverKind(pub u16);

impl ReceiverKind {
    /// Get the raw discriminant.
    pub const fn code(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for ReceiverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReceiverKind({})", self.0)
    }
}

/// A tagged reference to the entity a receipt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Receiver {
    /// The receiver's base kind.
    pub kind: ReceiverKind,
    /// The receiver's identifier within its kind.
    pub id: i64,
}

impl Receiver {
    pub const fn new(kind: ReceiverKind, id: i64) -> Self {
        Self { kind, id }
    }
}

/// An entity that can receive notifications.
///
/// `receiver_type` is the entity's concrete type name; the registry maps it
/// to a base kind.
pub trait Messageable {
    fn receiver_type(&self) -> &str;
    fn receiver_id(&self) -> i64;
}

/// Dispatch table from receiver type names to base kinds.
///
/// Base kinds carry caller-chosen codes. The code is what gets stored, so it
/// must stay the same for a type across processes and releases.
#[derive(Debug, Clone, Default)]
pub struct ReceiverRegistry {
    by_name: HashMap<String, ReceiverKind>,
    base_names: HashMap<ReceiverKind, String>,
}

impl ReceiverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a base receiver kind under `name` with the stored `code`.
    pub fn register(&mut self, name: &str, code: u16) -> Result<ReceiverKind, ValidationError> {
        if self.by_name.contains_key(name) {
            return Err(ValidationError::DuplicateReceiverType(name.to_string()));
        }
        let kind = ReceiverKind(code);
        if let Some(existing) = self.base_names.get(&kind) {
            return Err(ValidationError::DuplicateReceiverKind {
                code,
                existing: existing.clone(),
            });
        }
        self.by_name.insert(name.to_string(), kind);
        self.base_names.insert(kind, name.to_string());
        Ok(kind)
    }

    /// Register `name` as a subtype stored under the `base` kind.
    pub fn register_subtype(
        &mut self,
        name: &str,
        base: ReceiverKind,
    ) -> Result<(), ValidationError> {
        if self.by_name.contains_key(name) {
            return Err(ValidationError::DuplicateReceiverType(name.to_string()));
        }
        if !self.base_names.contains_key(&base) {
            return Err(ValidationError::UnknownReceiverType(format!("{:?}", base)));
        }
        self.by_name.insert(name.to_string(), base);
        Ok(())
    }

    /// Resolve a type name to its base kind.
    pub fn resolve(&self, name: &str) -> Option<ReceiverKind> {
        self.by_name.get(name).copied()
    }

    /// Build a receiver reference from a type name and id.
    pub fn receiver(&self, name: &str, id: i64) -> Result<Receiver, ValidationError> {
        self.resolve(name)
            .map(|kind| Receiver::new(kind, id))
            .ok_or_else(|| ValidationError::UnknownReceiverType(name.to_string()))
    }

    /// Build a receiver reference for an entity.
    pub fn receiver_for<M: Messageable + ?Sized>(
        &self,
        entity: &M,
    ) -> Result<Receiver, ValidationError> {
        self.receiver(entity.receiver_type(), entity.receiver_id())
    }
}
