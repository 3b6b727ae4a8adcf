//! Register the properties declared in a scene file and print every slot.

use super::load_config;
use crate::scene::Scene;
use anyhow::{Context as _, Result};
use propslot_core::{Context, PropertyEngine, SlotValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct SlotEntry {
    attribute: String,
    slot: String,
    host: String,
    value: SlotValue,
}

#[derive(Debug, Serialize)]
struct CommandEntry {
    op: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    record_type: String,
    record_types: Vec<String>,
    commands: Vec<CommandEntry>,
    owners: BTreeMap<String, Vec<SlotEntry>>,
}

pub fn inspect_scene(config_path: &Path, scene_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let scene = Scene::from_file(scene_path)?;
    let mut engine = PropertyEngine::new(config).context("Failed to start property engine")?;
    let ctx = Context::new(scene.context_root());

    let mut commands = Vec::new();
    for command in scene.commands() {
        let op = command.action.op();
        engine
            .dispatch(&ctx, command)
            .with_context(|| format!("Command {} failed", op))?;
        commands.push(CommandEntry {
            op: op.idname().to_string(),
            label: op.label().to_string(),
        });
    }

    for decl in scene.properties() {
        let owner = scene.owner(&decl.owner)?;
        let spec = scene
            .descriptor(decl)
            .with_context(|| format!("Invalid property {} on {}", decl.path, decl.owner))?;
        engine.register(&owner, &decl.path, spec)?;
    }

    let mut report = InspectReport {
        record_type: String::new(),
        record_types: engine.publisher().member_names().map(String::from).collect(),
        commands,
        owners: BTreeMap::new(),
    };
    for (name, owner) in scene.objects() {
        let slots = match engine.ensure_all(owner) {
            Ok(slots) => slots,
            Err(e) => {
                warn!(owner = name, error = %e, "skipping owner");
                continue;
            }
        };
        if slots.is_empty() {
            continue;
        }
        let active = engine.active().context("No active record")?;
        let entries = slots
            .into_iter()
            .map(|(attribute, key)| -> Result<SlotEntry> {
                let slot = active.slot(&key)?;
                Ok(SlotEntry {
                    host: slot.spec().kind.to_string(),
                    value: slot.get(&ctx),
                    slot: key.to_string(),
                    attribute,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        report.owners.insert(name.to_string(), entries);
    }
    if let Some(active) = engine.active() {
        report.record_type = active.type_name().to_string();
    }
    info!(owners = report.owners.len(), "scene inspected");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} (record types: {})",
            report.record_type,
            report.record_types.join(", ")
        );
        for command in &report.commands {
            println!("applied {} ({})", command.label, command.op);
        }
        for (owner, entries) in &report.owners {
            println!("{}:", owner);
            for entry in entries {
                println!("  {} = {} ({})", entry.slot, entry.value, entry.host);
            }
        }
    }
    Ok(())
}
