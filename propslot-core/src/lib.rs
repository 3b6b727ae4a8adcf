//! # propslot
//!
//! Projects attributes of arbitrary runtime objects onto statically typed
//! descriptor slots, the only thing a declarative UI can bind widgets to.
//!
//! - [`Registry`]: descriptors registered per owner (value and identity keyed)
//! - [`PropertyEngine::ensure`]: synthesizes accessors and installs them on
//!   the shared active record
//! - [`coerce`]: conversions between stored values and host slot values
//! - [`CommandBroker`]: generic add/remove/move/clear list commands
//!
//! ## Example
//!
//! ```
//! use propslot_core::{int_property, Class, Context, EngineConfig, PropOptions, PropertyEngine, SlotValue, Value};
//!
//! let mut engine = PropertyEngine::new(EngineConfig::default()).unwrap();
//! let group = Value::object(&Class::new("CustomGroup"), [("value", Value::Int(0))]);
//!
//! let slot = engine.set_property(&group, "value", int_property(PropOptions::new())).unwrap();
//! engine.write(&slot, SlotValue::Int(5), &Context::default()).unwrap();
//! assert_eq!(group.get_attr("value").unwrap(), Value::Int(5));
//! ```

pub mod broker;
pub mod coerce;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod factory;
pub mod path;
pub mod props;
pub mod publisher;
pub mod registry;
pub mod value;

pub use broker::{CollectionAction, CollectionCommand, CollectionOp, CommandBroker, CommandTarget};
pub use config::{ConfigError, EngineConfig};
pub use context::Context;
pub use engine::PropertyEngine;
pub use error::{AccessError, EngineError, Result};
pub use factory::{DescriptorFactory, Slot};
pub use path::{AttributePath, PathStep};
pub use props::{
    bool_property, bool_vector_property, enum_property, float_property, float_vector_property,
    int_property, int_vector_property, string_property, string_vector_property, DescriptorSpec,
    EnumItem, EnumItems, PropFlag, PropKind, PropOptions, ScalarKind, SlotValue,
};
pub use publisher::{ActiveRecord, RecordType, SlotPublisher};
pub use registry::{OwnerKey, RegisterMode, Registration, Registry};
pub use value::{Class, ClassRef, Hashing, HashKey, Instance, Key, Value};

pub use propslot_types::{ObjectId, SlotKey};
