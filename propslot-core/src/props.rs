//! Host descriptor API
//!
//! A descriptor is a `(kind, options)` pair, the shape of the host's property
//! constructors. The constructors here only assemble the pair; checks happen
//! in [`DescriptorSpec::validate`] when the descriptor is registered.

use crate::context::Context;
use crate::error::Result;
use crate::registry::RegisterMode;
use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Largest fixed array the host accepts
pub const MAX_ARRAY_SIZE: usize = 32;

/// Flag enums are carried in a 64-bit mask
pub const MAX_FLAG_ITEMS: usize = 64;

const DEFAULT_VECTOR_SIZE: usize = 3;

pub type ItemsFn = Arc<dyn Fn(&Value, &Context) -> Vec<EnumItem> + Send + Sync>;
pub type GetFn = Arc<dyn Fn(&Value) -> Result<SlotValue> + Send + Sync>;
pub type SetFn = Arc<dyn Fn(&Value, SlotValue) -> Result<()> + Send + Sync>;
pub type UpdateFn = Arc<dyn Fn(&Value, &Context) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Boolean,
    Integer,
    Float,
    String,
}

impl ScalarKind {
    /// Host type name, as used in diagnostics
    pub fn host_name(self) -> &'static str {
        match self {
            ScalarKind::Boolean => "BOOLEAN",
            ScalarKind::Integer => "INT",
            ScalarKind::Float => "FLOAT",
            ScalarKind::String => "STRING",
        }
    }

    /// Value the host shows when nothing better is known
    pub fn host_default(self) -> SlotValue {
        match self {
            ScalarKind::Boolean => SlotValue::Bool(false),
            ScalarKind::Integer => SlotValue::Int(0),
            ScalarKind::Float => SlotValue::Float(0.0),
            ScalarKind::String => SlotValue::Str(String::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Scalar(ScalarKind),
    Array { element: ScalarKind, size: usize },
    Enum,
    EnumFlag,
}

impl PropKind {
    pub fn is_enum(&self) -> bool {
        matches!(self, PropKind::Enum | PropKind::EnumFlag)
    }
}

impl fmt::Display for PropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropKind::Scalar(kind) => write!(f, "{}", kind.host_name()),
            PropKind::Array { element, size } => write!(f, "{}[{}]", element.host_name(), size),
            PropKind::Enum => write!(f, "ENUM"),
            PropKind::EnumFlag => write!(f, "ENUM_FLAG"),
        }
    }
}

/// Modifier flags from the host's `options` set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropFlag {
    /// Not persisted across saves
    SkipSave,
    Hidden,
    Animatable,
    EnumFlag,
    LibraryEditable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItem {
    pub identifier: String,
    pub name: String,
    pub description: String,
}

impl EnumItem {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl From<(&str, &str, &str)> for EnumItem {
    fn from((identifier, name, description): (&str, &str, &str)) -> Self {
        Self::new(identifier, name, description)
    }
}

/// Enum items: a fixed list, or a callable evaluated on every access
#[derive(Clone)]
pub enum EnumItems {
    Static(Vec<EnumItem>),
    Dynamic(ItemsFn),
}

impl EnumItems {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&Value, &Context) -> Vec<EnumItem> + Send + Sync + 'static,
    {
        EnumItems::Dynamic(Arc::new(f))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, EnumItems::Dynamic(_))
    }

    /// Current item list for `owner`
    pub fn resolve(&self, owner: &Value, ctx: &Context) -> Vec<EnumItem> {
        match self {
            EnumItems::Static(items) => items.clone(),
            EnumItems::Dynamic(f) => f(owner, ctx),
        }
    }
}

impl fmt::Debug for EnumItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumItems::Static(items) => f.debug_tuple("Static").field(items).finish(),
            EnumItems::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

impl<T: Into<EnumItem>> From<Vec<T>> for EnumItems {
    fn from(items: Vec<T>) -> Self {
        EnumItems::Static(items.into_iter().map(Into::into).collect())
    }
}

/// The host's options mapping
#[derive(Clone, Default)]
pub struct PropOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Scalar default, default array (a tuple) or default flag set
    pub default: Option<Value>,
    pub size: Option<usize>,
    pub items: Option<EnumItems>,
    pub flags: BTreeSet<PropFlag>,
    pub get: Option<GetFn>,
    pub set: Option<SetFn>,
    pub update: Option<UpdateFn>,
}

impl PropOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn default_array<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.default = Some(Value::tuple(values.into_iter().map(Into::into)));
        self
    }

    pub fn default_flag<'a>(mut self, identifiers: impl IntoIterator<Item = &'a str>) -> Self {
        self.default = Some(Value::set(identifiers));
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn items(mut self, items: impl Into<EnumItems>) -> Self {
        self.items = Some(items.into());
        self
    }

    pub fn flag(mut self, flag: PropFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    pub fn get<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<SlotValue> + Send + Sync + 'static,
    {
        self.get = Some(Arc::new(f));
        self
    }

    pub fn set<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, SlotValue) -> Result<()> + Send + Sync + 'static,
    {
        self.set = Some(Arc::new(f));
        self
    }

    pub fn update<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Context) + Send + Sync + 'static,
    {
        self.update = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for PropOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropOptions")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("default", &self.default)
            .field("size", &self.size)
            .field("items", &self.items)
            .field("flags", &self.flags)
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .field("update", &self.update.is_some())
            .finish()
    }
}

/// A registered descriptor: kind plus options
#[derive(Debug, Clone)]
pub struct DescriptorSpec {
    pub kind: PropKind,
    pub options: PropOptions,
}

impl DescriptorSpec {
    pub fn new(kind: PropKind, options: PropOptions) -> Self {
        Self { kind, options }
    }

    pub fn has_overrides(&self) -> bool {
        self.options.get.is_some() || self.options.set.is_some()
    }

    /// Check the descriptor the way the host would, returning the reason on
    /// failure
    pub fn validate(&self, mode: RegisterMode) -> std::result::Result<(), String> {
        if mode == RegisterMode::Coerce && self.has_overrides() {
            return Err("get/set overrides require pass-through registration".to_string());
        }

        match self.kind {
            PropKind::Scalar(kind) => {
                if let Some(default) = &self.options.default {
                    if !scalar_default_fits(kind, default) {
                        return Err(format!(
                            "default {} is not a valid {} value",
                            default,
                            kind.host_name()
                        ));
                    }
                }
            }
            PropKind::Array { element, size } => {
                if !(1..=MAX_ARRAY_SIZE).contains(&size) {
                    return Err(format!(
                        "array size {} outside 1..={}",
                        size, MAX_ARRAY_SIZE
                    ));
                }
                if let Some(default) = &self.options.default {
                    let items = default
                        .sequence_items()
                        .ok_or_else(|| format!("default array {} is not a sequence", default))?;
                    if items.len() != size {
                        return Err(format!(
                            "default array has length {}, expected {}",
                            items.len(),
                            size
                        ));
                    }
                    if !items.iter().all(|v| scalar_default_fits(element, v)) {
                        return Err(format!(
                            "default array {} has elements that are not {}",
                            default,
                            element.host_name()
                        ));
                    }
                }
            }
            PropKind::Enum | PropKind::EnumFlag => {
                let items = self
                    .options
                    .items
                    .as_ref()
                    .ok_or_else(|| "enum descriptor without items".to_string())?;
                if let EnumItems::Static(items) = items {
                    self.validate_static_enum(items)?;
                }
            }
        }
        Ok(())
    }

    fn validate_static_enum(&self, items: &[EnumItem]) -> std::result::Result<(), String> {
        let known = |id: &str| items.iter().any(|item| item.identifier == id);
        if self.kind == PropKind::EnumFlag && items.len() > MAX_FLAG_ITEMS {
            return Err(format!(
                "flag enum has {} items, at most {} are supported",
                items.len(),
                MAX_FLAG_ITEMS
            ));
        }
        let Some(default) = &self.options.default else {
            return Ok(());
        };
        match self.kind {
            PropKind::Enum => match default.as_str() {
                Some(id) if known(id) => Ok(()),
                _ => Err(format!("default {} is not an enum item", default)),
            },
            _ => {
                let members = default
                    .collection_members()
                    .ok_or_else(|| format!("default flag {} is not a collection", default))?;
                match members.iter().find(|m| !m.as_str().is_some_and(known)) {
                    Some(bad) => Err(format!("default flag member {} is not an enum item", bad)),
                    None => Ok(()),
                }
            }
        }
    }
}

fn scalar_default_fits(kind: ScalarKind, value: &Value) -> bool {
    match kind {
        ScalarKind::Boolean => matches!(value, Value::Bool(_)),
        ScalarKind::Integer => matches!(value, Value::Int(_) | Value::Bool(_)),
        ScalarKind::Float => matches!(value, Value::Float(_) | Value::Int(_)),
        ScalarKind::String => matches!(value, Value::Str(_)),
    }
}

pub fn bool_property(options: PropOptions) -> DescriptorSpec {
    DescriptorSpec::new(PropKind::Scalar(ScalarKind::Boolean), options)
}

pub fn int_property(options: PropOptions) -> DescriptorSpec {
    DescriptorSpec::new(PropKind::Scalar(ScalarKind::Integer), options)
}

pub fn float_property(options: PropOptions) -> DescriptorSpec {
    DescriptorSpec::new(PropKind::Scalar(ScalarKind::Float), options)
}

pub fn string_property(options: PropOptions) -> DescriptorSpec {
    DescriptorSpec::new(PropKind::Scalar(ScalarKind::String), options)
}

fn vector_property(element: ScalarKind, options: PropOptions) -> DescriptorSpec {
    let size = options.size.unwrap_or(DEFAULT_VECTOR_SIZE);
    DescriptorSpec::new(PropKind::Array { element, size }, options)
}

pub fn bool_vector_property(options: PropOptions) -> DescriptorSpec {
    vector_property(ScalarKind::Boolean, options)
}

pub fn int_vector_property(options: PropOptions) -> DescriptorSpec {
    vector_property(ScalarKind::Integer, options)
}

pub fn float_vector_property(options: PropOptions) -> DescriptorSpec {
    vector_property(ScalarKind::Float, options)
}

pub fn string_vector_property(options: PropOptions) -> DescriptorSpec {
    vector_property(ScalarKind::String, options)
}

/// Enum descriptor; a flag enum when the options carry [`PropFlag::EnumFlag`]
pub fn enum_property(items: impl Into<EnumItems>, options: PropOptions) -> DescriptorSpec {
    let kind = if options.flags.contains(&PropFlag::EnumFlag) {
        PropKind::EnumFlag
    } else {
        PropKind::Enum
    };
    DescriptorSpec::new(kind, options.items(items))
}

/// Primitive value a host widget reads and writes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlotValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<SlotValue>),
    /// Ordinal into the enum items
    Enum(usize),
    /// One bit per enum item position
    Flags(u64),
}

impl SlotValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SlotValue::Bool(_) => "bool",
            SlotValue::Int(_) => "int",
            SlotValue::Float(_) => "float",
            SlotValue::Str(_) => "str",
            SlotValue::Array(_) => "array",
            SlotValue::Enum(_) => "enum",
            SlotValue::Flags(_) => "flags",
        }
    }

    /// Plain host value for scalars and array elements
    pub fn to_value(&self) -> Value {
        match self {
            SlotValue::Bool(b) => Value::Bool(*b),
            SlotValue::Int(i) => Value::Int(*i),
            SlotValue::Float(f) => Value::Float(*f),
            SlotValue::Str(s) => Value::Str(s.clone()),
            SlotValue::Array(items) => Value::list(items.iter().map(SlotValue::to_value)),
            SlotValue::Enum(i) => Value::Int(*i as i64),
            SlotValue::Flags(mask) => Value::Int(*mask as i64),
        }
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Bool(true) => write!(f, "True"),
            SlotValue::Bool(false) => write!(f, "False"),
            SlotValue::Int(i) => write!(f, "{}", i),
            SlotValue::Float(x) => write!(f, "{:?}", x),
            SlotValue::Str(s) => write!(f, "'{}'", s),
            SlotValue::Array(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            SlotValue::Enum(i) => write!(f, "#{}", i),
            SlotValue::Flags(mask) => write!(f, "{:#b}", mask),
        }
    }
}
