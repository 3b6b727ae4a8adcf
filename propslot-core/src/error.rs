use crate::broker::CollectionOp;
use crate::value::Key;
use propslot_types::SlotKey;

/// Errors that can occur while registering, publishing or accessing slots
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid attribute path '{path}' at {position}: {message}")]
    InvalidPath {
        path: String,
        position: usize,
        message: String,
    },

    #[error("Attribute '{path}' could not be read: {cause}")]
    AttributeMissing {
        path: String,
        #[source]
        cause: AccessError,
    },

    #[error("Attribute '{path}' could not be written: {cause}")]
    AttributeWriteFailed {
        path: String,
        #[source]
        cause: AccessError,
    },

    #[error("Invalid descriptor for {owner}: '{path}': {reason}")]
    InvalidSpec {
        owner: String,
        path: String,
        reason: String,
    },

    #[error("Property not registered: {owner}: '{attribute}'")]
    UnknownAttribute { owner: String, attribute: String },

    #[error("Slot not installed on the active record: {0}")]
    UnknownSlot(SlotKey),

    #[error("No active record type is registered")]
    NoActiveRecord,

    #[error("Record type already registered: {0}")]
    DuplicateRecordType(String),

    #[error("Record type not registered: {0}")]
    UnknownRecordType(String),

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Enum ordinal {ordinal} out of range for {len} items")]
    InvalidOrdinal { ordinal: usize, len: usize },

    #[error("No {op} callback registered for '{key}'")]
    UnknownCallback { op: CollectionOp, key: String },

    #[error("{op} is not supported on a data path")]
    UnsupportedAction { op: CollectionOp },

    #[error("Target '{path}' is not a collection: {type_name}")]
    NotACollection { path: String, type_name: String },

    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Callback failed: {0}")]
    Callback(String),
}

/// Underlying cause of a failed attribute-path step
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccessError {
    #[error("'{type_name}' object has no attribute '{name}'")]
    NoAttribute { type_name: String, name: String },

    #[error("{type_name} index {index} out of range (length {len})")]
    IndexOutOfRange {
        type_name: String,
        index: i64,
        len: usize,
    },

    #[error("key not found: {0}")]
    KeyNotFound(Key),

    #[error("{type_name} indices must be integers, got {key}")]
    BadIndex { type_name: String, key: Key },

    #[error("'{0}' object is not subscriptable")]
    NotSubscriptable(String),

    #[error("'{0}' object does not support assignment")]
    ReadOnly(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
