//! Shared types for propslot
//!
//! This crate provides the identifier types passed between the engine and
//! its callers: the handle of a published descriptor slot and the identity
//! of a projected owner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a descriptor slot installed on the active record
///
/// The handle is the deterministic slot name
/// `<owner type name>_<owner identity>_<attribute path>`, so ensuring the same
/// owner and attribute twice in a session yields equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey(pub String);

impl SlotKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build the slot key for an attribute of an owner
    pub fn for_attribute(owner_name: &str, owner_id: ObjectId, attribute: &str) -> Self {
        Self(format!("{}_{}_{}", owner_name, owner_id, attribute))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotKey {
    fn from(name: &str) -> Self {
        SlotKey(name.to_string())
    }
}

/// Identity of a projected owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl ObjectId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(id: u64) -> Self {
        ObjectId(id)
    }
}

impl From<ObjectId> for u64 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
