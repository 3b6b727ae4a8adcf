//! Generic add/remove/move/clear commands for list-like values
//!
//! A command either names a callback registered for the current draw pass
//! (callback mode) or a path into the context that resolves to a list, which
//! is then mutated directly (path mode).

use crate::context::Context;
use crate::error::{EngineError, Result};
use crate::path::AttributePath;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionOp {
    Add,
    Remove,
    Move,
    Clear,
}

impl CollectionOp {
    /// Host command identifier
    pub fn idname(self) -> &'static str {
        match self {
            CollectionOp::Add => "wm.collection_add",
            CollectionOp::Remove => "wm.collection_remove",
            CollectionOp::Move => "wm.collection_move",
            CollectionOp::Clear => "wm.collection_clear",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CollectionOp::Add => "Collection Add",
            CollectionOp::Remove => "Collection Remove",
            CollectionOp::Move => "Collection Move",
            CollectionOp::Clear => "Collection Clear",
        }
    }
}

impl fmt::Display for CollectionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.idname())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTarget {
    /// Path into the context that resolves to a list
    Path(String),
    /// Key of a callback registered for this pass
    Callback(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionAction {
    Add,
    Remove { index: i64 },
    Move { from: i64, to: i64 },
    Clear,
}

impl CollectionAction {
    pub fn op(&self) -> CollectionOp {
        match self {
            CollectionAction::Add => CollectionOp::Add,
            CollectionAction::Remove { .. } => CollectionOp::Remove,
            CollectionAction::Move { .. } => CollectionOp::Move,
            CollectionAction::Clear => CollectionOp::Clear,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionCommand {
    pub target: CommandTarget,
    pub action: CollectionAction,
}

impl CollectionCommand {
    pub fn callback(function: impl Into<String>, action: CollectionAction) -> Self {
        Self {
            target: CommandTarget::Callback(function.into()),
            action,
        }
    }

    pub fn path(data_path: impl Into<String>, action: CollectionAction) -> Self {
        Self {
            target: CommandTarget::Path(data_path.into()),
            action,
        }
    }

    /// Build a command from the host's generic parameters
    ///
    /// An empty `data_path` selects callback mode. Add always runs in callback
    /// mode since only the callback can construct new elements.
    pub fn from_params(
        op: CollectionOp,
        data_path: &str,
        function: &str,
        index: i64,
        index_from: i64,
        index_to: i64,
    ) -> Self {
        let action = match op {
            CollectionOp::Add => CollectionAction::Add,
            CollectionOp::Remove => CollectionAction::Remove { index },
            CollectionOp::Move => CollectionAction::Move {
                from: index_from,
                to: index_to,
            },
            CollectionOp::Clear => CollectionAction::Clear,
        };
        if data_path.is_empty() || op == CollectionOp::Add {
            Self::callback(function, action)
        } else {
            Self::path(data_path, action)
        }
    }
}

pub type AddFn = Box<dyn FnMut(&Context) -> Result<()> + Send>;
pub type RemoveFn = Box<dyn FnMut(&Context, i64) -> Result<()> + Send>;
pub type MoveFn = Box<dyn FnMut(&Context, i64, i64) -> Result<()> + Send>;
pub type ClearFn = Box<dyn FnMut(&Context) -> Result<()> + Send>;

/// Per-operation callback registries
#[derive(Default)]
pub struct CommandBroker {
    add: HashMap<String, AddFn>,
    remove: HashMap<String, RemoveFn>,
    moves: HashMap<String, MoveFn>,
    clear: HashMap<String, ClearFn>,
}

impl CommandBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_add<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnMut(&Context) -> Result<()> + Send + 'static,
    {
        self.add.insert(key.into(), Box::new(f));
    }

    pub fn register_remove<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnMut(&Context, i64) -> Result<()> + Send + 'static,
    {
        self.remove.insert(key.into(), Box::new(f));
    }

    pub fn register_move<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnMut(&Context, i64, i64) -> Result<()> + Send + 'static,
    {
        self.moves.insert(key.into(), Box::new(f));
    }

    pub fn register_clear<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: FnMut(&Context) -> Result<()> + Send + 'static,
    {
        self.clear.insert(key.into(), Box::new(f));
    }

    pub fn is_registered(&self, op: CollectionOp, key: &str) -> bool {
        match op {
            CollectionOp::Add => self.add.contains_key(key),
            CollectionOp::Remove => self.remove.contains_key(key),
            CollectionOp::Move => self.moves.contains_key(key),
            CollectionOp::Clear => self.clear.contains_key(key),
        }
    }

    /// Drop every registered callback; callers re-register on each pass
    pub fn clear_callbacks(&mut self) {
        self.add.clear();
        self.remove.clear();
        self.moves.clear();
        self.clear.clear();
    }

    pub fn dispatch(&mut self, ctx: &Context, command: &CollectionCommand) -> Result<()> {
        let op = command.action.op();
        debug!(op = %op, target = ?command.target, "dispatching collection command");
        match &command.target {
            CommandTarget::Callback(key) => self.run_callback(ctx, key, command.action),
            CommandTarget::Path(path) => apply_to_path(ctx, path, command.action),
        }
    }

    fn run_callback(&mut self, ctx: &Context, key: &str, action: CollectionAction) -> Result<()> {
        let unknown = || EngineError::UnknownCallback {
            op: action.op(),
            key: key.to_string(),
        };
        match action {
            CollectionAction::Add => {
                let callback = self.add.get_mut(key).ok_or_else(unknown)?;
                callback(ctx)
            }
            CollectionAction::Remove { index } => {
                let callback = self.remove.get_mut(key).ok_or_else(unknown)?;
                callback(ctx, index)
            }
            CollectionAction::Move { from, to } => {
                let callback = self.moves.get_mut(key).ok_or_else(unknown)?;
                callback(ctx, from, to)
            }
            CollectionAction::Clear => {
                let callback = self.clear.get_mut(key).ok_or_else(unknown)?;
                callback(ctx)
            }
        }
    }
}

impl fmt::Debug for CommandBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBroker")
            .field("add", &self.add.keys().collect::<Vec<_>>())
            .field("remove", &self.remove.keys().collect::<Vec<_>>())
            .field("move", &self.moves.keys().collect::<Vec<_>>())
            .field("clear", &self.clear.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn checked_index(index: i64, len: usize) -> Result<usize> {
    if index < 0 || index >= len as i64 {
        return Err(EngineError::IndexOutOfRange { index, len });
    }
    Ok(index as usize)
}

/// Mutate the list at `path` directly
fn apply_to_path(ctx: &Context, path: &str, action: CollectionAction) -> Result<()> {
    let parsed = AttributePath::parse(path)?;
    let list = match ctx.resolve(&parsed)? {
        Value::List(list) => list,
        other => {
            return Err(EngineError::NotACollection {
                path: path.to_string(),
                type_name: other.type_name(),
            })
        }
    };
    let mut items = list.write();
    match action {
        CollectionAction::Add => {
            return Err(EngineError::UnsupportedAction {
                op: CollectionOp::Add,
            })
        }
        CollectionAction::Remove { index } => {
            let index = checked_index(index, items.len())?;
            items.remove(index);
        }
        CollectionAction::Move { from, to } => {
            let from = checked_index(from, items.len())?;
            let to = checked_index(to, items.len())?;
            let item = items.remove(from);
            items.insert(to, item);
        }
        CollectionAction::Clear => items.clear(),
    }
    Ok(())
}
