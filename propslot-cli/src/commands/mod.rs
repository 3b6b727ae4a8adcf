//! CLI command implementations.

pub mod demo;
pub mod inspect;

pub use demo::run_demo;
pub use inspect::inspect_scene;

use anyhow::{Context, Result};
use propslot_core::EngineConfig;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG: &str = "propslot.yml";

/// Load the engine configuration
///
/// A missing default config file means built-in defaults; a missing file
/// named explicitly is an error.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG) {
        debug!("no {} found, using defaults", DEFAULT_CONFIG);
        return Ok(EngineConfig::default());
    }
    EngineConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}
