//! Host execution context handed to item callables, update hooks and
//! collection commands.

use crate::error::Result;
use crate::path::AttributePath;
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct Context {
    root: Value,
}

impl Context {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Resolve a path against the context root
    pub fn resolve(&self, path: &AttributePath) -> Result<Value> {
        path.read(&self.root)
    }
}
