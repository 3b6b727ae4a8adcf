//! Engine facade tying the registry, slot publisher and command broker
//! together.

use crate::broker::{CollectionCommand, CommandBroker};
use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::{EngineError, Result};
use crate::factory::{self, DescriptorFactory};
use crate::props::{DescriptorSpec, SlotValue};
use crate::publisher::{ActiveRecord, SlotPublisher};
use crate::registry::{RegisterMode, Registration, Registry};
use crate::value::Value;
use propslot_types::SlotKey;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Projects attributes of runtime owners onto descriptor slots
///
/// One engine holds the state of one session: the registrations, the shared
/// record set and the per-pass command callbacks.
#[derive(Debug)]
pub struct PropertyEngine {
    config: EngineConfig,
    registry: Registry,
    factory: DescriptorFactory,
    publisher: SlotPublisher,
    broker: CommandBroker,
}

impl PropertyEngine {
    /// Create an engine with `config.record_type` as the first record type
    pub fn new(config: EngineConfig) -> Result<Self> {
        let mut publisher = SlotPublisher::new(config.active_attr.clone());
        publisher.register(&config.record_type)?;
        info!(record_type = %config.record_type, location = %config.active_attr, "property engine ready");
        Ok(Self {
            factory: DescriptorFactory::new(config.warn_on_fallback),
            registry: Registry::new(),
            publisher,
            broker: CommandBroker::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn publisher(&self) -> &SlotPublisher {
        &self.publisher
    }

    /// Register a descriptor whose accessors apply the coercion rules
    pub fn register(&mut self, owner: &Value, path: &str, spec: DescriptorSpec) -> Result<()> {
        self.registry
            .register(owner, path, spec, RegisterMode::Coerce)
            .map(|_| ())
    }

    /// Register a descriptor that may carry get/set overrides
    pub fn register_pass_through(
        &mut self,
        owner: &Value,
        path: &str,
        spec: DescriptorSpec,
    ) -> Result<()> {
        if !self.config.allow_pass_through {
            return Err(EngineError::InvalidSpec {
                owner: owner.to_string(),
                path: path.to_string(),
                reason: "pass-through registration is disabled".to_string(),
            });
        }
        self.registry
            .register(owner, path, spec, RegisterMode::PassThrough)
            .map(|_| ())
    }

    pub fn unregister(&mut self, owner: &Value, path: &str) -> bool {
        self.registry.unregister(owner, path)
    }

    /// Register `spec` and ensure its slot in one call
    pub fn set_property(
        &mut self,
        owner: &Value,
        path: &str,
        spec: DescriptorSpec,
    ) -> Result<SlotKey> {
        self.register(owner, path, spec)?;
        self.ensure(owner, &[path])?
            .remove(path)
            .ok_or_else(|| EngineError::UnknownAttribute {
                owner: owner.to_string(),
                attribute: path.to_string(),
            })
    }

    /// Install slots for `attributes` of `owner` (every registered path when
    /// empty) and return the slot key of each
    ///
    /// Every attribute is resolved before anything is installed. A slot that
    /// is already installed from the same registration is left alone.
    pub fn ensure(
        &mut self,
        owner: &Value,
        attributes: &[&str],
    ) -> Result<BTreeMap<String, SlotKey>> {
        let registrations = self.registry.lookup(owner);
        let requested: Vec<(String, &Registration)> = if attributes.is_empty() {
            registrations
                .iter()
                .map(|(path, reg)| (path.clone(), reg))
                .collect()
        } else {
            attributes
                .iter()
                .map(|attr| {
                    registrations
                        .get(*attr)
                        .map(|reg| (attr.to_string(), reg))
                        .ok_or_else(|| EngineError::UnknownAttribute {
                            owner: owner.to_string(),
                            attribute: attr.to_string(),
                        })
                })
                .collect::<Result<_>>()?
        };

        let mut mapping = BTreeMap::new();
        for (attribute, registration) in requested {
            let key = factory::slot_key(owner, &attribute);
            let current = self
                .publisher
                .installed(&key)
                .is_some_and(|slot| Arc::ptr_eq(slot.spec(), &registration.spec));
            if current {
                debug!(slot = %key, "slot already installed");
            } else {
                let slot = self.factory.synthesize(owner, registration);
                self.publisher.install(slot);
            }
            mapping.insert(attribute, key);
        }
        Ok(mapping)
    }

    /// Every registered path of `owner`
    pub fn ensure_all(&mut self, owner: &Value) -> Result<BTreeMap<String, SlotKey>> {
        self.ensure(owner, &[])
    }

    pub fn register_record_type(&mut self, name: &str) -> Result<()> {
        self.publisher.register(name)
    }

    pub fn unregister_record_type(&mut self, name: &str) -> Result<()> {
        self.publisher.unregister(name)
    }

    pub fn active(&self) -> Option<ActiveRecord<'_>> {
        self.publisher.active()
    }

    /// Read a slot through the active record
    pub fn read(&self, slot: &SlotKey, ctx: &Context) -> Result<SlotValue> {
        self.active().ok_or(EngineError::NoActiveRecord)?.get(slot, ctx)
    }

    /// Write a slot through the active record
    pub fn write(&self, slot: &SlotKey, value: SlotValue, ctx: &Context) -> Result<()> {
        self.active()
            .ok_or(EngineError::NoActiveRecord)?
            .set(slot, ctx, value)
    }

    pub fn broker(&self) -> &CommandBroker {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut CommandBroker {
        &mut self.broker
    }

    pub fn dispatch(&mut self, ctx: &Context, command: &CollectionCommand) -> Result<()> {
        self.broker.dispatch(ctx, command)
    }
}
