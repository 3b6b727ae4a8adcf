//! Shared record set onto which synthesized slots are installed
//!
//! Every registered record type carries the full accumulated slot set, so any
//! member can back the active record. The set is counted: the active record
//! exists while at least one member is registered.

use crate::context::Context;
use crate::error::{EngineError, Result};
use crate::factory::Slot;
use crate::props::SlotValue;
use propslot_types::SlotKey;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A member of the shared record set
#[derive(Debug)]
pub struct RecordType {
    name: String,
    slots: BTreeMap<SlotKey, Arc<Slot>>,
}

impl RecordType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self, key: &SlotKey) -> Option<&Arc<Slot>> {
        self.slots.get(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug)]
pub struct SlotPublisher {
    location: String,
    members: Vec<RecordType>,
    /// Every slot installed since the set was created
    installed: BTreeMap<SlotKey, Arc<Slot>>,
    users: usize,
    active: Option<String>,
}

impl SlotPublisher {
    /// `location` names where the host exposes the active record
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            members: Vec::new(),
            installed: BTreeMap::new(),
            users: 0,
            active: None,
        }
    }

    /// Add a record type to the set, copying every installed slot onto it
    pub fn register(&mut self, name: &str) -> Result<()> {
        if self.members.iter().any(|m| m.name == name) {
            return Err(EngineError::DuplicateRecordType(name.to_string()));
        }
        self.members.push(RecordType {
            name: name.to_string(),
            slots: self.installed.clone(),
        });
        self.users += 1;
        if self.active.is_none() {
            self.active = Some(name.to_string());
        }
        debug!(record_type = name, users = self.users, slots = self.installed.len(), "registered record type");
        Ok(())
    }

    /// Remove a record type; the last removal tears the active record down
    pub fn unregister(&mut self, name: &str) -> Result<()> {
        let index = self
            .members
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| EngineError::UnknownRecordType(name.to_string()))?;
        self.members.remove(index);
        self.users -= 1;

        if self.users == 0 {
            self.active = None;
            self.installed.clear();
            debug!(record_type = name, "last record type unregistered, active record torn down");
        } else if self.active.as_deref() == Some(name) {
            self.active = self.members.first().map(|m| m.name.clone());
            debug!(record_type = name, active = ?self.active, "active record repointed");
        }
        Ok(())
    }

    /// Slot currently installed under `key`
    pub fn installed(&self, key: &SlotKey) -> Option<&Arc<Slot>> {
        self.installed.get(key)
    }

    /// Install `slot` on every member, replacing any slot with the same key
    pub fn install(&mut self, slot: Slot) -> Arc<Slot> {
        let slot = Arc::new(slot);
        let key = slot.key().clone();
        for member in &mut self.members {
            member.slots.insert(key.clone(), Arc::clone(&slot));
        }
        self.installed.insert(key.clone(), Arc::clone(&slot));
        debug!(slot = %key, members = self.members.len(), "installed slot");
        slot
    }

    pub fn users(&self) -> usize {
        self.users
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// The active record, if any member is registered
    pub fn active(&self) -> Option<ActiveRecord<'_>> {
        let name = self.active.as_deref()?;
        let record = self.members.iter().find(|m| m.name == name)?;
        Some(ActiveRecord {
            record,
            location: &self.location,
        })
    }
}

/// The shared instance every draw site reads and writes slots through
#[derive(Debug, Clone, Copy)]
pub struct ActiveRecord<'a> {
    record: &'a RecordType,
    location: &'a str,
}

impl<'a> ActiveRecord<'a> {
    /// Name of the record type currently backing the active record
    pub fn type_name(&self) -> &'a str {
        &self.record.name
    }

    pub fn location(&self) -> &'a str {
        self.location
    }

    pub fn has(&self, key: &SlotKey) -> bool {
        self.record.slots.contains_key(key)
    }

    pub fn slot(&self, key: &SlotKey) -> Result<&'a Arc<Slot>> {
        self.record
            .slot(key)
            .ok_or_else(|| EngineError::UnknownSlot(key.clone()))
    }

    pub fn slot_keys(&self) -> impl Iterator<Item = &'a SlotKey> {
        self.record.slots.keys()
    }

    pub fn get(&self, key: &SlotKey, ctx: &Context) -> Result<SlotValue> {
        Ok(self.slot(key)?.get(ctx))
    }

    pub fn set(&self, key: &SlotKey, ctx: &Context, value: SlotValue) -> Result<()> {
        self.slot(key)?.set(ctx, value)
    }
}
