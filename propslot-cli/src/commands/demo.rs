//! Replay the reference property panel.
//!
//! Descriptors are registered once up front. Each pass then mirrors one host
//! redraw: callbacks are cleared, slots are ensured and read, then the panel's
//! buttons are "clicked" through the command broker.

use super::load_config;
use anyhow::{Context as _, Result};
use propslot_core::{
    bool_property, bool_vector_property, enum_property, float_property, float_vector_property,
    int_property, int_vector_property, string_property, Class, ClassRef, CollectionAction,
    CollectionCommand, Context, EngineError, EnumItem, EnumItems, PropFlag, PropOptions,
    PropertyEngine, Value,
};
use propslot_types::SlotKey;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct SlotReport {
    attribute: String,
    slot: String,
    value: propslot_core::SlotValue,
    host: String,
}

#[derive(Debug, Serialize)]
struct DemoSummary {
    record_type: String,
    location: String,
    passes: usize,
    slots: Vec<SlotReport>,
    items: Vec<SlotReport>,
    item_count: usize,
}

fn abc() -> Vec<EnumItem> {
    ["A", "B", "C"]
        .into_iter()
        .map(|id| EnumItem::new(id, id, ""))
        .collect()
}

/// The panel's data: one group object holding every property kind plus a
/// list of items
struct Panel {
    group_class: ClassRef,
    item_class: ClassRef,
    group: Value,
    item_list: Value,
}

impl Panel {
    fn new() -> Self {
        let group_class = Class::new("CustomGroup");
        let item_class = Class::new("CustomItem");
        let item_list = Value::list([]);
        let group = Value::object(
            &group_class,
            [
                ("int_value", Value::Int(1)),
                ("float_value", Value::Float(1.0)),
                ("bool_value", Value::Bool(true)),
                // Not a string; the slot shows the default instead
                ("str_value", Value::Int(100)),
                // Longer than the declared size
                (
                    "int_array",
                    Value::list([Value::Int(1), Value::Int(2), Value::Int(3)]),
                ),
                (
                    "float_array",
                    Value::list([Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)]),
                ),
                (
                    "bool_array",
                    Value::list([Value::Bool(true), Value::Bool(false), Value::Bool(true)]),
                ),
                ("enum", Value::str("A")),
                ("enum_flag", Value::list([Value::str("A"), Value::str("B")])),
                ("enum_flag_func", Value::set(["invalidvalue", "B"])),
                ("item_list", item_list.clone()),
            ],
        );
        Self {
            group_class,
            item_class,
            group,
            item_list,
        }
    }

    fn context(&self) -> Context {
        let root = Class::new("Context");
        Context::new(Value::object(&root, [("group", self.group.clone())]))
    }

    fn items(&self) -> Vec<Value> {
        self.item_list.sequence_items().unwrap_or_default()
    }

    fn register(&self, engine: &mut PropertyEngine) -> Result<()> {
        let owner = Value::class(&self.group_class);
        let flag = || PropOptions::new().flag(PropFlag::EnumFlag);
        let descriptors = [
            ("int_value", int_property(PropOptions::new().name("Int"))),
            ("float_value", float_property(PropOptions::new().name("Float"))),
            ("bool_value", bool_property(PropOptions::new().name("Bool"))),
            ("str_value", string_property(PropOptions::new().name("String"))),
            ("int_array", int_vector_property(PropOptions::new().size(2))),
            ("float_array", float_vector_property(PropOptions::new())),
            ("bool_array", bool_vector_property(PropOptions::new())),
            ("bool_array[1]", bool_property(PropOptions::new())),
            ("enum", enum_property(abc(), PropOptions::new())),
            ("enum_flag", enum_property(abc(), flag())),
            (
                "enum_flag_func",
                enum_property(EnumItems::dynamic(|_, _| abc()), flag()),
            ),
        ];
        for (path, spec) in descriptors {
            engine
                .register(&owner, path, spec)
                .with_context(|| format!("Failed to register {}", path))?;
        }
        let item_owner = Value::class(&self.item_class);
        engine.register(&item_owner, "a", int_property(PropOptions::new()))?;
        Ok(())
    }

    fn register_callbacks(&self, engine: &mut PropertyEngine) {
        let list = self.item_list.clone();
        let class = self.item_class.clone();
        engine
            .broker_mut()
            .register_add(self.add_key(), move |_ctx: &Context| {
                let item = Value::object(&class, [("a", Value::Int(1))]);
                if let Value::List(items) = &list {
                    items.write().push(item);
                }
                Ok(())
            });

        for item in self.items() {
            let key = item.id().to_string();
            let list = self.item_list.clone();
            engine
                .broker_mut()
                .register_remove(key.clone(), move |_ctx: &Context, index| {
                    with_items(&list, |items| {
                        let index = checked(index, items.len())?;
                        items.remove(index);
                        Ok(())
                    })
                });
            let list = self.item_list.clone();
            engine
                .broker_mut()
                .register_move(key, move |_ctx: &Context, from, to| {
                    with_items(&list, |items| {
                        let from = checked(from, items.len())?;
                        let to = checked(to, items.len())?;
                        let item = items.remove(from);
                        items.insert(to, item);
                        Ok(())
                    })
                });
        }
    }

    fn add_key(&self) -> String {
        format!("{}_collection", self.group.id())
    }
}

fn checked(index: i64, len: usize) -> propslot_core::Result<usize> {
    if index < 0 || index >= len as i64 {
        return Err(EngineError::IndexOutOfRange { index, len });
    }
    Ok(index as usize)
}

fn with_items<F>(list: &Value, f: F) -> propslot_core::Result<()>
where
    F: FnOnce(&mut Vec<Value>) -> propslot_core::Result<()>,
{
    match list {
        Value::List(items) => f(&mut items.write()),
        other => Err(EngineError::NotACollection {
            path: "item_list".to_string(),
            type_name: other.type_name(),
        }),
    }
}

fn report(
    engine: &PropertyEngine,
    ctx: &Context,
    attribute: &str,
    key: &SlotKey,
) -> Result<SlotReport> {
    let active = engine.active().context("No active record")?;
    let slot = active.slot(key)?;
    Ok(SlotReport {
        attribute: attribute.to_string(),
        slot: key.to_string(),
        value: active.get(key, ctx)?,
        host: slot.spec().kind.to_string(),
    })
}

/// One redraw of the panel; returns the group and item slot reports
fn draw(
    engine: &mut PropertyEngine,
    panel: &Panel,
    ctx: &Context,
) -> Result<(Vec<SlotReport>, Vec<SlotReport>)> {
    engine.broker_mut().clear_callbacks();

    let group_slots = engine.ensure_all(&panel.group)?;
    let slots = group_slots
        .iter()
        .map(|(attribute, key)| report(engine, ctx, attribute, key))
        .collect::<Result<Vec<_>>>()?;

    panel.register_callbacks(engine);

    let mut items = Vec::new();
    for item in panel.items() {
        let key = engine.ensure(&item, &["a"])?.remove("a");
        if let Some(key) = key {
            items.push(report(engine, ctx, "a", &key)?);
        }
    }
    Ok((slots, items))
}

/// Simulate the panel's buttons: add one item, swap the first two, drop the
/// last once there are more than two
fn click(engine: &mut PropertyEngine, panel: &Panel, ctx: &Context) -> Result<()> {
    let items = panel.items();
    let mut commands = vec![CollectionCommand::callback(
        panel.add_key(),
        CollectionAction::Add,
    )];
    if items.len() >= 2 {
        commands.push(CollectionCommand::callback(
            items[0].id().to_string(),
            CollectionAction::Move { from: 0, to: 1 },
        ));
    }
    if items.len() > 2 {
        let last = items.len() - 1;
        commands.push(CollectionCommand::callback(
            items[last].id().to_string(),
            CollectionAction::Remove { index: last as i64 },
        ));
    }
    for command in &commands {
        debug!(op = %command.action.op(), "click");
        engine.dispatch(ctx, command)?;
    }
    Ok(())
}

/// Run `passes` redraws of the reference panel and print the final slots
pub fn run_demo(config_path: &Path, passes: usize, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let mut engine = PropertyEngine::new(config).context("Failed to start property engine")?;
    let panel = Panel::new();
    let ctx = panel.context();
    panel.register(&mut engine)?;

    let mut last = (Vec::new(), Vec::new());
    for pass in 0..passes {
        last = draw(&mut engine, &panel, &ctx)
            .with_context(|| format!("Draw pass {} failed", pass + 1))?;
        click(&mut engine, &panel, &ctx)?;
    }
    info!(passes, items = panel.items().len(), "demo finished");

    let active = engine.active().context("No active record")?;
    let (slots, items) = last;
    let summary = DemoSummary {
        record_type: active.type_name().to_string(),
        location: active.location().to_string(),
        passes,
        slots,
        items,
        item_count: panel.items().len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} at {}: {} passes, {} items",
            summary.record_type, summary.location, summary.passes, summary.item_count
        );
        for slot in summary.slots.iter().chain(summary.items.iter()) {
            println!(
                "{:<16} {:<12} {} ({})",
                slot.attribute, slot.host, slot.value, slot.slot
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use propslot_core::{EngineConfig, SlotValue};
    use std::sync::Arc;

    fn setup() -> (PropertyEngine, Panel, Context) {
        let mut engine = PropertyEngine::new(EngineConfig::default()).unwrap();
        let panel = Panel::new();
        panel.register(&mut engine).unwrap();
        let ctx = panel.context();
        (engine, panel, ctx)
    }

    fn value_of<'a>(reports: &'a [SlotReport], attribute: &str) -> &'a SlotValue {
        &reports
            .iter()
            .find(|r| r.attribute == attribute)
            .unwrap()
            .value
    }

    #[test]
    fn test_first_pass_values() {
        let (mut engine, panel, ctx) = setup();
        let (slots, items) = draw(&mut engine, &panel, &ctx).unwrap();

        assert_eq!(value_of(&slots, "int_value"), &SlotValue::Int(1));
        assert_eq!(value_of(&slots, "float_value"), &SlotValue::Float(1.0));
        assert_eq!(value_of(&slots, "bool_value"), &SlotValue::Bool(true));
        assert_eq!(value_of(&slots, "str_value"), &SlotValue::Str(String::new()));
        assert_eq!(
            value_of(&slots, "int_array"),
            &SlotValue::Array(vec![SlotValue::Int(0), SlotValue::Int(0)])
        );
        assert_eq!(value_of(&slots, "bool_array[1]"), &SlotValue::Bool(false));
        assert_eq!(value_of(&slots, "enum"), &SlotValue::Enum(0));
        assert_eq!(value_of(&slots, "enum_flag"), &SlotValue::Flags(0b11));
        assert_eq!(value_of(&slots, "enum_flag_func"), &SlotValue::Flags(0b10));
        assert!(items.is_empty());
    }

    #[test]
    fn test_clicks_grow_then_cap_the_list() {
        let (mut engine, panel, ctx) = setup();

        for _ in 0..2 {
            draw(&mut engine, &panel, &ctx).unwrap();
            click(&mut engine, &panel, &ctx).unwrap();
        }
        assert_eq!(panel.items().len(), 2);

        let first = panel.items()[0].clone();
        draw(&mut engine, &panel, &ctx).unwrap();
        click(&mut engine, &panel, &ctx).unwrap();
        // Add then swap
        assert_eq!(panel.items().len(), 3);
        assert!(panel.items()[1].is(&first));

        draw(&mut engine, &panel, &ctx).unwrap();
        click(&mut engine, &panel, &ctx).unwrap();
        // Add, swap, drop the last of the three seen during the draw
        assert_eq!(panel.items().len(), 3);
    }

    #[test]
    fn test_item_slots_are_per_instance() {
        let (mut engine, panel, ctx) = setup();
        for _ in 0..3 {
            draw(&mut engine, &panel, &ctx).unwrap();
            click(&mut engine, &panel, &ctx).unwrap();
        }
        let (_, items) = draw(&mut engine, &panel, &ctx).unwrap();
        assert_eq!(items.len(), 3);
        let mut keys: Vec<_> = items.iter().map(|r| r.slot.clone()).collect();
        keys.dedup();
        assert_eq!(keys.len(), 3);
        assert!(items.iter().all(|r| r.value == SlotValue::Int(1)));
    }

    #[test]
    fn test_slots_reused_across_passes() {
        let (mut engine, panel, ctx) = setup();
        draw(&mut engine, &panel, &ctx).unwrap();
        let keys = engine.ensure_all(&panel.group).unwrap();
        let first: Vec<_> = keys
            .values()
            .map(|key| Arc::clone(engine.publisher().installed(key).unwrap()))
            .collect();

        click(&mut engine, &panel, &ctx).unwrap();
        draw(&mut engine, &panel, &ctx).unwrap();
        for (key, slot) in keys.values().zip(&first) {
            assert!(Arc::ptr_eq(slot, engine.publisher().installed(key).unwrap()));
        }
        assert_eq!(first.len(), 11);
    }
}
