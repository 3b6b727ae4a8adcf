//! Runtime object model for projected owners
//!
//! Owners are arbitrary host objects whose shape is only known at runtime.
//! Scalars and tuples have value semantics; lists, sets, dicts, instances and
//! classes are shared handles, so a mutation made through one clone is seen by
//! every other clone, and their identity is the address of the shared
//! allocation.

use crate::error::AccessError;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use propslot_types::ObjectId;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub type ListRef = Arc<RwLock<Vec<Value>>>;
pub type SetRef = Arc<RwLock<BTreeSet<Key>>>;
pub type DictRef = Arc<RwLock<BTreeMap<Key, Value>>>;
pub type ObjectRef = Arc<RwLock<Instance>>;
pub type ClassRef = Arc<Class>;

/// Dict key, set member, or bracket literal in an attribute path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    pub fn into_value(self) -> Value {
        match self {
            Key::Int(i) => Value::Int(i),
            Key::Str(s) => Value::Str(s),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            Key::Int(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

/// How instances of a class take part in hashing and equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hashing {
    /// Hashed and compared by identity
    #[default]
    Identity,
    /// Hashed and compared by attribute values
    Fields,
    /// Instances cannot be used as value keys
    Unhashable,
}

/// A class: a name, a hashing policy for its instances, and class attributes
#[derive(Debug)]
pub struct Class {
    name: String,
    hashing: Hashing,
    attrs: RwLock<BTreeMap<String, Value>>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> ClassRef {
        Self::with_hashing(name, Hashing::Identity)
    }

    pub fn with_hashing(name: impl Into<String>, hashing: Hashing) -> ClassRef {
        Arc::new(Self {
            name: name.into(),
            hashing,
            attrs: RwLock::new(BTreeMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hashing(&self) -> Hashing {
        self.hashing
    }

    pub fn get_attr(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    pub fn set_attr(&self, name: impl Into<String>, value: Value) {
        self.attrs.write().insert(name.into(), value);
    }

    /// Create an instance with no attributes
    pub fn instantiate(self: &Arc<Self>) -> Value {
        Value::Object(Arc::new(RwLock::new(Instance {
            class: Arc::clone(self),
            attrs: BTreeMap::new(),
        })))
    }
}

/// An instance of a user class
#[derive(Debug)]
pub struct Instance {
    class: ClassRef,
    attrs: BTreeMap<String, Value>,
}

impl Instance {
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    pub fn attrs(&self) -> &BTreeMap<String, Value> {
        &self.attrs
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.attrs.insert(name.into(), value);
    }
}

/// Builtin value types, each with a shared class object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    Tuple,
    List,
    Set,
    Dict,
    Type,
}

const BUILTINS: [Builtin; 10] = [
    Builtin::NoneType,
    Builtin::Bool,
    Builtin::Int,
    Builtin::Float,
    Builtin::Str,
    Builtin::Tuple,
    Builtin::List,
    Builtin::Set,
    Builtin::Dict,
    Builtin::Type,
];

static BUILTIN_CLASSES: Lazy<Vec<ClassRef>> =
    Lazy::new(|| BUILTINS.iter().map(|b| Class::new(b.name())).collect());

impl Builtin {
    fn name(self) -> &'static str {
        match self {
            Builtin::NoneType => "NoneType",
            Builtin::Bool => "bool",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Str => "str",
            Builtin::Tuple => "tuple",
            Builtin::List => "list",
            Builtin::Set => "set",
            Builtin::Dict => "dict",
            Builtin::Type => "type",
        }
    }

    fn class(self) -> ClassRef {
        Arc::clone(&BUILTIN_CLASSES[self as usize])
    }
}

/// Hashable projection of a value, used as a registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
    Tuple(Vec<HashKey>),
    Identity(ObjectId),
    Record {
        class: ObjectId,
        fields: Vec<(String, HashKey)>,
    },
}

/// Integral floats share the key of the equal integer, so `1.0` and `1`
/// name the same owner
fn float_key(f: f64) -> HashKey {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        HashKey::Int(f as i64)
    } else {
        HashKey::Float(f.to_bits())
    }
}

/// Runtime value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Value>),
    List(ListRef),
    Set(SetRef),
    Dict(DictRef),
    Object(ObjectRef),
    Class(ClassRef),
}

fn ptr_id<T>(ptr: *const T) -> ObjectId {
    ObjectId(ptr as usize as u64)
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Arc::new(RwLock::new(items.into_iter().collect())))
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn set<K: Into<Key>>(members: impl IntoIterator<Item = K>) -> Self {
        Value::Set(Arc::new(RwLock::new(
            members.into_iter().map(Into::into).collect(),
        )))
    }

    pub fn dict<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Dict(Arc::new(RwLock::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Create an instance of `class` with the given attributes
    pub fn object<S: Into<String>>(
        class: &ClassRef,
        attrs: impl IntoIterator<Item = (S, Value)>,
    ) -> Self {
        Value::Object(Arc::new(RwLock::new(Instance {
            class: Arc::clone(class),
            attrs: attrs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })))
    }

    pub fn class(class: &ClassRef) -> Self {
        Value::Class(Arc::clone(class))
    }

    fn builtin(&self) -> Option<Builtin> {
        match self {
            Value::None => Some(Builtin::NoneType),
            Value::Bool(_) => Some(Builtin::Bool),
            Value::Int(_) => Some(Builtin::Int),
            Value::Float(_) => Some(Builtin::Float),
            Value::Str(_) => Some(Builtin::Str),
            Value::Tuple(_) => Some(Builtin::Tuple),
            Value::List(_) => Some(Builtin::List),
            Value::Set(_) => Some(Builtin::Set),
            Value::Dict(_) => Some(Builtin::Dict),
            Value::Class(_) => Some(Builtin::Type),
            Value::Object(_) => None,
        }
    }

    /// Name of the value's type (the class name for instances)
    pub fn type_name(&self) -> String {
        match self {
            Value::Object(obj) => obj.read().class.name.clone(),
            other => other
                .builtin()
                .map(|b| b.name().to_string())
                .unwrap_or_default(),
        }
    }

    /// The class this value is an instance of
    pub fn class_of(&self) -> ClassRef {
        match self {
            Value::Object(obj) => Arc::clone(&obj.read().class),
            other => other.builtin().unwrap_or(Builtin::Type).class(),
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Value::Class(_))
    }

    /// Identity of the value
    ///
    /// Shared values are identified by their allocation; value types by a
    /// fingerprint of their contents.
    pub fn id(&self) -> ObjectId {
        match self {
            Value::List(l) => ptr_id(Arc::as_ptr(l)),
            Value::Set(s) => ptr_id(Arc::as_ptr(s)),
            Value::Dict(d) => ptr_id(Arc::as_ptr(d)),
            Value::Object(o) => ptr_id(Arc::as_ptr(o)),
            Value::Class(c) => ptr_id(Arc::as_ptr(c)),
            _ => {
                let mut hasher = DefaultHasher::new();
                self.fingerprint(&mut hasher);
                ObjectId(hasher.finish())
            }
        }
    }

    fn fingerprint<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::None => 0u8.hash(state),
            Value::Bool(b) => (1u8, b).hash(state),
            Value::Int(i) => (2u8, i).hash(state),
            Value::Float(f) => match float_key(*f) {
                HashKey::Int(i) => (2u8, i).hash(state),
                _ => (3u8, f.to_bits()).hash(state),
            },
            Value::Str(s) => (4u8, s).hash(state),
            Value::Tuple(items) => {
                (5u8, items.len()).hash(state);
                for item in items {
                    item.fingerprint(state);
                }
            }
            shared => (6u8, shared.id()).hash(state),
        }
    }

    /// Hashable projection, or `None` when the value is unhashable
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::None => Some(HashKey::None),
            Value::Bool(b) => Some(HashKey::Bool(*b)),
            Value::Int(i) => Some(HashKey::Int(*i)),
            Value::Float(f) => Some(float_key(*f)),
            Value::Str(s) => Some(HashKey::Str(s.clone())),
            Value::Tuple(items) => items
                .iter()
                .map(Value::hash_key)
                .collect::<Option<Vec<_>>>()
                .map(HashKey::Tuple),
            Value::List(_) | Value::Set(_) | Value::Dict(_) => None,
            Value::Object(obj) => {
                let inst = obj.read();
                match inst.class.hashing {
                    Hashing::Identity => Some(HashKey::Identity(self.id())),
                    Hashing::Unhashable => None,
                    Hashing::Fields => {
                        let fields = inst
                            .attrs
                            .iter()
                            .map(|(name, v)| v.hash_key().map(|h| (name.clone(), h)))
                            .collect::<Option<Vec<_>>>()?;
                        Some(HashKey::Record {
                            class: ptr_id(Arc::as_ptr(&inst.class)),
                            fields,
                        })
                    }
                }
            }
            Value::Class(_) => Some(HashKey::Identity(self.id())),
        }
    }

    pub fn is_hashable(&self) -> bool {
        self.hash_key().is_some()
    }

    /// Whether two values are the same object
    pub fn is(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<Key> {
        match self {
            Value::Int(i) => Some(Key::Int(*i)),
            Value::Str(s) => Some(Key::Str(s.clone())),
            _ => None,
        }
    }

    /// Snapshot of the elements of a list or tuple
    pub fn sequence_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::Tuple(items) => Some(items.clone()),
            Value::List(list) => Some(list.read().clone()),
            _ => None,
        }
    }

    /// Snapshot of the members of a collection that supports `in`
    pub fn collection_members(&self) -> Option<Vec<Value>> {
        match self {
            Value::Tuple(_) | Value::List(_) => self.sequence_items(),
            Value::Set(set) => Some(set.read().iter().cloned().map(Key::into_value).collect()),
            Value::Dict(dict) => Some(dict.read().keys().cloned().map(Key::into_value).collect()),
            _ => None,
        }
    }

    /// Attribute lookup: instance attributes first, then class attributes
    pub fn get_attr(&self, name: &str) -> Result<Value, AccessError> {
        let found = match self {
            Value::Object(obj) => {
                let inst = obj.read();
                inst.attrs
                    .get(name)
                    .cloned()
                    .or_else(|| inst.class.get_attr(name))
            }
            Value::Class(class) => class.get_attr(name),
            _ => None,
        };
        found.ok_or_else(|| AccessError::NoAttribute {
            type_name: self.type_name(),
            name: name.to_string(),
        })
    }

    pub fn set_attr(&self, name: &str, value: Value) -> Result<(), AccessError> {
        match self {
            Value::Object(obj) => {
                obj.write().set(name, value);
                Ok(())
            }
            Value::Class(class) => {
                class.set_attr(name, value);
                Ok(())
            }
            _ => Err(AccessError::NoAttribute {
                type_name: self.type_name(),
                name: name.to_string(),
            }),
        }
    }

    pub fn get_item(&self, key: &Key) -> Result<Value, AccessError> {
        match self {
            Value::Tuple(items) => {
                let idx = self.sequence_index(key, items.len())?;
                Ok(items[idx].clone())
            }
            Value::List(list) => {
                let items = list.read();
                let idx = self.sequence_index(key, items.len())?;
                Ok(items[idx].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let idx = self.sequence_index(key, chars.len())?;
                Ok(Value::Str(chars[idx].to_string()))
            }
            Value::Dict(dict) => dict
                .read()
                .get(key)
                .cloned()
                .ok_or_else(|| AccessError::KeyNotFound(key.clone())),
            _ => Err(AccessError::NotSubscriptable(self.type_name())),
        }
    }

    pub fn set_item(&self, key: &Key, value: Value) -> Result<(), AccessError> {
        match self {
            Value::List(list) => {
                let mut items = list.write();
                let idx = self.sequence_index(key, items.len())?;
                items[idx] = value;
                Ok(())
            }
            Value::Dict(dict) => {
                dict.write().insert(key.clone(), value);
                Ok(())
            }
            _ => Err(AccessError::ReadOnly(self.type_name())),
        }
    }

    /// Resolve a (possibly negative) sequence index against a length
    fn sequence_index(&self, key: &Key, len: usize) -> Result<usize, AccessError> {
        let index = match key {
            Key::Int(i) => *i,
            Key::Str(_) => {
                return Err(AccessError::BadIndex {
                    type_name: self.type_name(),
                    key: key.clone(),
                })
            }
        };
        let resolved = if index < 0 { index + len as i64 } else { index };
        if resolved < 0 || resolved >= len as i64 {
            return Err(AccessError::IndexOutOfRange {
                type_name: self.type_name(),
                index,
                len,
            });
        }
        Ok(resolved as usize)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
                float_key(*f) == HashKey::Int(*i)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (Value::Dict(a), Value::Dict(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (Value::Object(a), Value::Object(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (x, y) = (a.read(), b.read());
                Arc::ptr_eq(&x.class, &y.class)
                    && x.class.hashing == Hashing::Fields
                    && x.attrs == y.attrs
            }
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        key.into_value()
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_joined(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::List(list) => {
                write!(f, "[")?;
                write_joined(f, &list.read())?;
                write!(f, "]")
            }
            Value::Set(set) => {
                let members: Vec<Value> = set.read().iter().cloned().map(Key::into_value).collect();
                if members.is_empty() {
                    return write!(f, "set()");
                }
                write!(f, "{{")?;
                write_joined(f, &members)?;
                write!(f, "}}")
            }
            Value::Dict(dict) => {
                let entries: Vec<String> = dict
                    .read()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.clone().into_value(), v))
                    .collect();
                write!(f, "{{")?;
                write_joined(f, &entries)?;
                write!(f, "}}")
            }
            Value::Object(obj) => write!(f, "<{} object>", obj.read().class.name),
            Value::Class(class) => write!(f, "<class '{}'>", class.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_list_mutation_visible_through_clones() {
        let list = Value::list([Value::Int(1), Value::Int(2)]);
        let alias = list.clone();
        alias.set_item(&Key::Int(0), Value::Int(9)).unwrap();
        assert_eq!(list.get_item(&Key::Int(0)).unwrap(), Value::Int(9));
        assert!(list.is(&alias));
    }

    #[test]
    fn test_negative_index() {
        let t = Value::tuple([Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(t.get_item(&Key::Int(-1)).unwrap(), Value::Int(3));
        assert!(matches!(
            t.get_item(&Key::Int(3)),
            Err(AccessError::IndexOutOfRange { index: 3, len: 3, .. })
        ));
    }

    #[test]
    fn test_tuple_is_read_only() {
        let t = Value::tuple([Value::Int(1)]);
        assert_eq!(
            t.set_item(&Key::Int(0), Value::Int(2)),
            Err(AccessError::ReadOnly("tuple".to_string()))
        );
    }

    #[test]
    fn test_instance_falls_back_to_class_attribute() {
        let class = Class::new("Hoge");
        class.set_attr("a", Value::Int(1));
        let obj = class.instantiate();
        assert_eq!(obj.get_attr("a").unwrap(), Value::Int(1));

        obj.set_attr("a", Value::Int(2)).unwrap();
        assert_eq!(obj.get_attr("a").unwrap(), Value::Int(2));
        assert_eq!(class.get_attr("a"), Some(Value::Int(1)));
    }

    #[test]
    fn test_hashability() {
        assert!(Value::Int(1).is_hashable());
        assert!(Value::tuple([Value::str("a")]).is_hashable());
        assert!(!Value::list([]).is_hashable());
        assert!(!Value::tuple([Value::list([])]).is_hashable());
        assert!(!Value::dict::<Key>([]).is_hashable());

        let plain = Class::new("Plain");
        assert!(plain.instantiate().is_hashable());
        let unhashable = Class::with_hashing("Mutable", Hashing::Unhashable);
        assert!(!unhashable.instantiate().is_hashable());
    }

    #[test]
    fn test_field_hashing_equates_equal_instances() {
        let point = Class::with_hashing("Point", Hashing::Fields);
        let a = Value::object(&point, [("x", Value::Int(1))]);
        let b = Value::object(&point, [("x", Value::Int(1))]);
        assert_eq!(a.hash_key(), b.hash_key());
        assert_eq!(a, b);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_integral_float_matches_int_key() {
        assert_eq!(Value::Float(1.0).hash_key(), Value::Int(1).hash_key());
        assert_eq!(Value::Float(-0.0).hash_key(), Some(HashKey::Int(0)));
        assert_eq!(Value::Float(1.0), Value::Int(1));
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(2.0).id(), Value::Int(2).id());

        assert_ne!(Value::Float(1.5).hash_key(), Value::Int(1).hash_key());
        assert_ne!(Value::Float(1.5), Value::Int(1));
        assert!(matches!(
            Value::Float(f64::INFINITY).hash_key(),
            Some(HashKey::Float(_))
        ));
        assert_eq!(
            Value::tuple([Value::Float(3.0)]).hash_key(),
            Value::tuple([Value::Int(3)]).hash_key()
        );
    }

    #[test]
    fn test_class_of() {
        let class = Class::new("CustomGroup");
        let obj = class.instantiate();
        assert!(Arc::ptr_eq(&obj.class_of(), &class));
        assert_eq!(Value::list([]).class_of().name(), "list");
        assert_eq!(Value::class(&class).class_of().name(), "type");
        assert!(Arc::ptr_eq(
            &Value::list([]).class_of(),
            &Value::list([]).class_of()
        ));
    }

    #[test]
    fn test_display() {
        let v = Value::tuple([Value::Float(1.0), Value::Bool(true), Value::str("A")]);
        assert_eq!(v.to_string(), "(1.0, True, 'A')");
        assert_eq!(Value::set(["A", "C"]).to_string(), "{'A', 'C'}");
        assert_eq!(Value::set::<Key>([]).to_string(), "set()");
    }
}
