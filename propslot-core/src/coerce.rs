//! Conversions between stored owner values and host slot values
//!
//! Reads never fail: [`decode`] returns `None` when the stored value does not
//! fit the descriptor and the caller substitutes [`fallback`]. Writes fail
//! with an error when the slot value cannot be stored.

use crate::error::{EngineError, Result};
use crate::props::{DescriptorSpec, EnumItem, PropKind, ScalarKind, SlotValue, MAX_FLAG_ITEMS};
use crate::value::Value;

/// Ordinal of `identifier` in the item list
pub fn ordinal(items: &[EnumItem], identifier: &str) -> Option<usize> {
    items.iter().position(|item| item.identifier == identifier)
}

/// Identifier at `ordinal` in the item list
pub fn identifier(items: &[EnumItem], ordinal: usize) -> Option<&str> {
    items.get(ordinal).map(|item| item.identifier.as_str())
}

/// Bitmask of the item positions named by `members`
///
/// Members that are not strings or not items are skipped.
pub fn encode_flags(items: &[EnumItem], members: &[Value]) -> u64 {
    items
        .iter()
        .take(MAX_FLAG_ITEMS)
        .enumerate()
        .filter(|(_, item)| {
            members
                .iter()
                .any(|m| m.as_str() == Some(item.identifier.as_str()))
        })
        .fold(0u64, |mask, (i, _)| mask | (1u64 << i))
}

/// Identifiers whose bit is set in `mask`, in item order
pub fn decode_flags(items: &[EnumItem], mask: u64) -> Vec<String> {
    items
        .iter()
        .take(MAX_FLAG_ITEMS)
        .enumerate()
        .filter(|(i, _)| mask & (1u64 << i) != 0)
        .map(|(_, item)| item.identifier.clone())
        .collect()
}

/// Scalar read: exact type, with `bool` accepted where an int is expected
fn scalar(kind: ScalarKind, value: &Value) -> Option<SlotValue> {
    match (kind, value) {
        (ScalarKind::Boolean, Value::Bool(b)) => Some(SlotValue::Bool(*b)),
        (ScalarKind::Integer, Value::Int(i)) => Some(SlotValue::Int(*i)),
        (ScalarKind::Integer, Value::Bool(b)) => Some(SlotValue::Int(*b as i64)),
        (ScalarKind::Float, Value::Float(f)) => Some(SlotValue::Float(*f)),
        (ScalarKind::String, Value::Str(s)) => Some(SlotValue::Str(s.clone())),
        _ => None,
    }
}

/// Declared defaults may spell a float as an int
fn scalar_default(kind: ScalarKind, value: &Value) -> Option<SlotValue> {
    match (kind, value) {
        (ScalarKind::Float, Value::Int(i)) => Some(SlotValue::Float(*i as f64)),
        _ => scalar(kind, value),
    }
}

/// Convert a stored value to the slot representation
pub fn decode(spec: &DescriptorSpec, stored: &Value, items: &[EnumItem]) -> Option<SlotValue> {
    match spec.kind {
        PropKind::Scalar(kind) => scalar(kind, stored),
        PropKind::Array { element, size } => {
            let seq = stored.sequence_items()?;
            if seq.len() != size {
                return None;
            }
            seq.iter()
                .map(|v| scalar(element, v))
                .collect::<Option<Vec<_>>>()
                .map(SlotValue::Array)
        }
        PropKind::Enum => stored
            .as_str()
            .and_then(|id| ordinal(items, id))
            .map(SlotValue::Enum),
        PropKind::EnumFlag => {
            let members = stored.collection_members()?;
            if members.is_empty() {
                return None;
            }
            Some(SlotValue::Flags(encode_flags(items, &members)))
        }
    }
}

/// Value shown when the stored value cannot be decoded
pub fn fallback(spec: &DescriptorSpec, items: &[EnumItem]) -> SlotValue {
    let default = spec.options.default.as_ref();
    let dynamic = spec
        .options
        .items
        .as_ref()
        .is_some_and(|items| items.is_dynamic());

    match spec.kind {
        PropKind::Scalar(kind) => default
            .and_then(|d| scalar_default(kind, d))
            .unwrap_or_else(|| kind.host_default()),
        PropKind::Array { element, size } => default
            .and_then(Value::sequence_items)
            .filter(|seq| seq.len() == size)
            .and_then(|seq| {
                seq.iter()
                    .map(|v| scalar_default(element, v))
                    .collect::<Option<Vec<_>>>()
            })
            .map(SlotValue::Array)
            .unwrap_or_else(|| SlotValue::Array(vec![element.host_default(); size])),
        PropKind::Enum if dynamic => SlotValue::Enum(0),
        PropKind::Enum => SlotValue::Enum(
            default
                .and_then(Value::as_str)
                .and_then(|id| ordinal(items, id))
                .unwrap_or(0),
        ),
        PropKind::EnumFlag if dynamic => SlotValue::Flags(0),
        PropKind::EnumFlag => SlotValue::Flags(
            default
                .and_then(Value::collection_members)
                .map(|members| encode_flags(items, &members))
                .unwrap_or(0),
        ),
    }
}

fn mismatch(spec: &DescriptorSpec, got: &SlotValue) -> EngineError {
    EngineError::TypeMismatch {
        expected: spec.kind.to_string(),
        got: got.type_name().to_string(),
    }
}

fn scalar_to_value(kind: ScalarKind, value: &SlotValue) -> Option<Value> {
    match (kind, value) {
        (ScalarKind::Boolean, SlotValue::Bool(b)) => Some(Value::Bool(*b)),
        (ScalarKind::Integer, SlotValue::Int(i)) => Some(Value::Int(*i)),
        (ScalarKind::Float, SlotValue::Float(f)) => Some(Value::Float(*f)),
        (ScalarKind::Float, SlotValue::Int(i)) => Some(Value::Float(*i as f64)),
        (ScalarKind::String, SlotValue::Str(s)) => Some(Value::Str(s.clone())),
        _ => None,
    }
}

/// Convert a slot value to the value to store
///
/// `previous` is the currently stored value; arrays and flag sets keep its
/// container family.
pub fn encode(
    spec: &DescriptorSpec,
    value: SlotValue,
    previous: &Value,
    items: &[EnumItem],
) -> Result<Value> {
    match spec.kind {
        PropKind::Scalar(kind) => {
            scalar_to_value(kind, &value).ok_or_else(|| mismatch(spec, &value))
        }
        PropKind::Array { element, size } => {
            let elements = match &value {
                SlotValue::Array(elements) if elements.len() == size => elements,
                _ => return Err(mismatch(spec, &value)),
            };
            let converted = elements
                .iter()
                .map(|e| scalar_to_value(element, e))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| mismatch(spec, &value))?;
            Ok(match previous {
                Value::Tuple(_) => Value::tuple(converted),
                _ => Value::list(converted),
            })
        }
        PropKind::Enum => {
            let ordinal = match value {
                SlotValue::Enum(i) => i,
                SlotValue::Int(i) if i >= 0 => i as usize,
                other => return Err(mismatch(spec, &other)),
            };
            identifier(items, ordinal)
                .map(Value::str)
                .ok_or(EngineError::InvalidOrdinal {
                    ordinal,
                    len: items.len(),
                })
        }
        PropKind::EnumFlag => {
            let mask = match value {
                SlotValue::Flags(mask) => mask,
                SlotValue::Int(i) if i >= 0 => i as u64,
                other => return Err(mismatch(spec, &other)),
            };
            let identifiers = decode_flags(items, mask);
            Ok(match previous {
                Value::Tuple(_) => Value::tuple(identifiers.into_iter().map(Value::Str)),
                Value::Set(_) => Value::set(identifiers),
                _ => Value::list(identifiers.into_iter().map(Value::Str)),
            })
        }
    }
}
