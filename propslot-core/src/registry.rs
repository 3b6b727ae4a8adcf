//! Descriptor registrations keyed by owner value and owner identity
//!
//! A registration is stored under the owner's value when the owner is
//! hashable and, always, under its identity. Lookups merge the owner's class
//! registrations with its own, the owner's entries taking precedence.

use crate::error::{EngineError, Result};
use crate::path::AttributePath;
use crate::props::DescriptorSpec;
use crate::value::{HashKey, Value};
use propslot_types::ObjectId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// How a registered descriptor is turned into accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterMode {
    /// Accessors apply the coercion rules; get/set overrides are rejected
    #[default]
    Coerce,
    /// get/set overrides are used as given
    PassThrough,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerKey {
    Value(HashKey),
    Identity(ObjectId),
}

impl OwnerKey {
    /// Keys an owner is stored under, in increasing precedence
    pub fn keys_for(owner: &Value) -> Vec<OwnerKey> {
        let mut keys = Vec::with_capacity(2);
        if let Some(hash) = owner.hash_key() {
            keys.push(OwnerKey::Value(hash));
        }
        keys.push(OwnerKey::Identity(owner.id()));
        keys
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub path: AttributePath,
    pub spec: Arc<DescriptorSpec>,
    pub mode: RegisterMode,
}

#[derive(Debug)]
struct OwnerEntry {
    /// Held so that the identity key cannot be reused by another allocation
    _owner: Value,
    attrs: BTreeMap<String, Registration>,
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<OwnerKey, OwnerEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spec` for `path` on `owner`, replacing any earlier spec
    pub fn register(
        &mut self,
        owner: &Value,
        path: &str,
        spec: DescriptorSpec,
        mode: RegisterMode,
    ) -> Result<Registration> {
        let parsed = AttributePath::parse(path)?;
        spec.validate(mode).map_err(|reason| EngineError::InvalidSpec {
            owner: owner.to_string(),
            path: path.to_string(),
            reason,
        })?;

        let registration = Registration {
            path: parsed,
            spec: Arc::new(spec),
            mode,
        };
        for key in OwnerKey::keys_for(owner) {
            self.entries
                .entry(key)
                .or_insert_with(|| OwnerEntry {
                    _owner: owner.clone(),
                    attrs: BTreeMap::new(),
                })
                .attrs
                .insert(path.to_string(), registration.clone());
        }
        debug!(owner = %owner, path, kind = %registration.spec.kind, "registered descriptor");
        Ok(registration)
    }

    /// Drop the registration for `path` on `owner`; returns whether one existed
    pub fn unregister(&mut self, owner: &Value, path: &str) -> bool {
        let mut removed = false;
        for key in OwnerKey::keys_for(owner) {
            if let Some(entry) = self.entries.get_mut(&key) {
                removed |= entry.attrs.remove(path).is_some();
                if entry.attrs.is_empty() {
                    self.entries.remove(&key);
                }
            }
        }
        removed
    }

    /// All registrations that apply to `owner`
    ///
    /// Merged from the owner's class by value and by identity, then the owner
    /// by value and by identity; later entries win.
    pub fn lookup(&self, owner: &Value) -> BTreeMap<String, Registration> {
        let class = Value::Class(owner.class_of());
        let mut merged = BTreeMap::new();
        for key in OwnerKey::keys_for(&class)
            .into_iter()
            .chain(OwnerKey::keys_for(owner))
        {
            if let Some(entry) = self.entries.get(&key) {
                merged.extend(
                    entry
                        .attrs
                        .iter()
                        .map(|(path, reg)| (path.clone(), reg.clone())),
                );
            }
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
