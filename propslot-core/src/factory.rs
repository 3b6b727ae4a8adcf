//! Accessor synthesis
//!
//! A [`Slot`] binds one registration to one concrete owner. Its getter walks
//! the attribute path and applies the coercion rules, degrading to the
//! declared default on any failure; its setter encodes the host value, writes
//! it back and then runs the update hook.

use crate::coerce;
use crate::context::Context;
use crate::error::Result;
use crate::path::AttributePath;
use crate::props::{DescriptorSpec, EnumItem, SlotValue};
use crate::registry::{RegisterMode, Registration};
use crate::value::Value;
use propslot_types::SlotKey;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

type ReadFn = Box<dyn Fn(&Context) -> SlotValue + Send + Sync>;
type WriteFn = Box<dyn Fn(&Context, SlotValue) -> Result<()> + Send + Sync>;
type HookFn = Box<dyn Fn(&Context) + Send + Sync>;

struct Accessors {
    get: ReadFn,
    set: WriteFn,
    update: Option<HookFn>,
}

/// A synthesized descriptor slot bound to one owner
pub struct Slot {
    key: SlotKey,
    attribute: String,
    spec: Arc<DescriptorSpec>,
    accessors: Accessors,
}

impl Slot {
    pub fn key(&self) -> &SlotKey {
        &self.key
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn spec(&self) -> &Arc<DescriptorSpec> {
        &self.spec
    }

    /// Read the projected value; never fails
    pub fn get(&self, ctx: &Context) -> SlotValue {
        (self.accessors.get)(ctx)
    }

    /// Write the projected value, then run the update hook
    pub fn set(&self, ctx: &Context, value: SlotValue) -> Result<()> {
        if let Err(err) = (self.accessors.set)(ctx, value) {
            warn!(slot = %self.key, error = %err, "slot write failed");
            return Err(err);
        }
        if let Some(update) = &self.accessors.update {
            update(ctx);
        }
        Ok(())
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("key", &self.key)
            .field("attribute", &self.attribute)
            .field("kind", &self.spec.kind)
            .field("update", &self.accessors.update.is_some())
            .finish()
    }
}

/// Name used in slot keys: the class name for class owners, else the type name
pub fn owner_name(owner: &Value) -> String {
    match owner {
        Value::Class(class) => class.name().to_string(),
        other => other.type_name(),
    }
}

/// Deterministic slot key for `attribute` on `owner`
pub fn slot_key(owner: &Value, attribute: &str) -> SlotKey {
    SlotKey::for_attribute(&owner_name(owner), owner.id(), attribute)
}

fn resolve_items(spec: &DescriptorSpec, owner: &Value, ctx: &Context) -> Vec<EnumItem> {
    spec.options
        .items
        .as_ref()
        .map(|items| items.resolve(owner, ctx))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy)]
pub struct DescriptorFactory {
    warn_on_fallback: bool,
}

impl DescriptorFactory {
    pub fn new(warn_on_fallback: bool) -> Self {
        Self { warn_on_fallback }
    }

    /// Build the slot for `registration` bound to `owner`
    ///
    /// get/set overrides are only honored for pass-through registrations;
    /// coerce registrations always get coercing accessors.
    pub fn synthesize(&self, owner: &Value, registration: &Registration) -> Slot {
        let key = slot_key(owner, registration.path.as_str());
        let spec = Arc::clone(&registration.spec);
        let pass_through = registration.mode == RegisterMode::PassThrough;

        let get = match spec.options.get.clone().filter(|_| pass_through) {
            Some(get) => self.override_getter(owner, &spec, &key, get),
            None => self.coercing_getter(owner, &registration.path, &spec, &key),
        };
        let set: WriteFn = match spec.options.set.clone().filter(|_| pass_through) {
            Some(set) => {
                let owner = owner.clone();
                Box::new(move |_ctx: &Context, value: SlotValue| set(&owner, value))
            }
            None => coercing_setter(owner, &registration.path, &spec),
        };
        let update = spec.options.update.clone().map(|update| {
            let owner = owner.clone();
            Box::new(move |ctx: &Context| update(&owner, ctx)) as HookFn
        });

        debug!(slot = %key, attribute = registration.path.as_str(), "synthesized slot");
        Slot {
            key,
            attribute: registration.path.as_str().to_string(),
            spec,
            accessors: Accessors { get, set, update },
        }
    }

    fn coercing_getter(
        &self,
        owner: &Value,
        path: &AttributePath,
        spec: &Arc<DescriptorSpec>,
        key: &SlotKey,
    ) -> ReadFn {
        let (owner, path, spec, key) = (owner.clone(), path.clone(), Arc::clone(spec), key.clone());
        let warn_on_fallback = self.warn_on_fallback;
        Box::new(move |ctx: &Context| {
            let items = resolve_items(&spec, &owner, ctx);
            let stored = match path.read(&owner) {
                Ok(value) => value,
                Err(err) => {
                    warn!(slot = %key, error = %err, "slot read failed, using default");
                    return coerce::fallback(&spec, &items);
                }
            };
            if let Some(value) = coerce::decode(&spec, &stored, &items) {
                return value;
            }
            let fallback = coerce::fallback(&spec, &items);
            if !matches!(stored, Value::None) {
                if warn_on_fallback {
                    warn!(slot = %key, expected = %spec.kind, got = %stored, "unexpected stored value, using default");
                } else {
                    debug!(slot = %key, expected = %spec.kind, got = %stored, "unexpected stored value, using default");
                }
            }
            fallback
        })
    }

    fn override_getter(
        &self,
        owner: &Value,
        spec: &Arc<DescriptorSpec>,
        key: &SlotKey,
        get: crate::props::GetFn,
    ) -> ReadFn {
        let (owner, spec, key) = (owner.clone(), Arc::clone(spec), key.clone());
        Box::new(move |ctx: &Context| match get(&owner) {
            Ok(value) => value,
            Err(err) => {
                warn!(slot = %key, error = %err, "get override failed, using default");
                coerce::fallback(&spec, &resolve_items(&spec, &owner, ctx))
            }
        })
    }
}

impl Default for DescriptorFactory {
    fn default() -> Self {
        Self::new(true)
    }
}

fn coercing_setter(owner: &Value, path: &AttributePath, spec: &Arc<DescriptorSpec>) -> WriteFn {
    let (owner, path, spec) = (owner.clone(), path.clone(), Arc::clone(spec));
    Box::new(move |ctx: &Context, value: SlotValue| {
        let items = resolve_items(&spec, &owner, ctx);
        let previous = path.read(&owner).unwrap_or_default();
        let stored = coerce::encode(&spec, value, &previous, &items)?;
        path.write(&owner, stored)
    })
}
