//! Integration tests for the property engine

use propslot_core::{
    bool_property, bool_vector_property, enum_property, float_property, int_property,
    int_vector_property, string_property, Class, CollectionAction, CollectionCommand,
    CollectionOp, Context, EngineConfig, EngineError, EnumItem, EnumItems, Hashing, PropFlag,
    PropOptions, PropertyEngine, SlotValue, Value,
};
use std::sync::Arc;

fn engine() -> PropertyEngine {
    PropertyEngine::new(EngineConfig::default()).unwrap()
}

fn abc() -> Vec<EnumItem> {
    vec![
        EnumItem::new("A", "A", ""),
        EnumItem::new("B", "B", ""),
        EnumItem::new("C", "C", ""),
    ]
}

#[test]
fn test_scalar_round_trips() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Value::object(
        &Class::new("Scalars"),
        [
            ("b", Value::Bool(false)),
            ("i", Value::Int(0)),
            ("f", Value::Float(0.0)),
            ("s", Value::str("")),
        ],
    );

    let b = engine.set_property(&obj, "b", bool_property(PropOptions::new())).unwrap();
    let i = engine.set_property(&obj, "i", int_property(PropOptions::new())).unwrap();
    let f = engine.set_property(&obj, "f", float_property(PropOptions::new())).unwrap();
    let s = engine.set_property(&obj, "s", string_property(PropOptions::new())).unwrap();

    for (key, value) in [
        (&b, SlotValue::Bool(true)),
        (&i, SlotValue::Int(-42)),
        (&f, SlotValue::Float(2.5)),
        (&s, SlotValue::Str("hello".into())),
    ] {
        engine.write(key, value.clone(), &ctx).unwrap();
        assert_eq!(engine.read(key, &ctx).unwrap(), value);
    }
}

#[test]
fn test_integer_default_then_write() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Class::new("Hoge").instantiate();
    engine
        .register(&obj, "value", int_property(PropOptions::new().default_value(0)))
        .unwrap();

    let key = engine.ensure(&obj, &["value"]).unwrap()["value"].clone();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Int(0));

    engine.write(&key, SlotValue::Int(5), &ctx).unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Int(5));
}

#[test]
fn test_array_fallback_and_family() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Value::object(
        &Class::new("Arrays"),
        [("v", Value::tuple([Value::Int(1), Value::Int(2), Value::Int(3)]))],
    );
    let key = engine
        .set_property(
            &obj,
            "v",
            int_vector_property(PropOptions::new().default_array([0, 0, 0])),
        )
        .unwrap();

    obj.set_attr("v", Value::list([Value::Int(1), Value::Int(2)]))
        .unwrap();
    assert_eq!(
        engine.read(&key, &ctx).unwrap(),
        SlotValue::Array(vec![SlotValue::Int(0); 3])
    );

    obj.set_attr("v", Value::tuple([Value::Int(1), Value::Int(2), Value::Int(3)]))
        .unwrap();
    engine
        .write(
            &key,
            SlotValue::Array(vec![SlotValue::Int(4), SlotValue::Int(5), SlotValue::Int(6)]),
            &ctx,
        )
        .unwrap();
    assert!(matches!(obj.get_attr("v").unwrap(), Value::Tuple(_)));

    obj.set_attr("v", Value::list([Value::Int(1), Value::Int(2), Value::Int(3)]))
        .unwrap();
    engine
        .write(
            &key,
            SlotValue::Array(vec![SlotValue::Int(7), SlotValue::Int(8), SlotValue::Int(9)]),
            &ctx,
        )
        .unwrap();
    assert!(matches!(obj.get_attr("v").unwrap(), Value::List(_)));
}

#[test]
fn test_enum_unknown_identifier_falls_back_to_default() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Value::object(&Class::new("Enums"), [("e", Value::str("ZZZ"))]);
    let key = engine
        .set_property(&obj, "e", enum_property(abc(), PropOptions::new().default_value("B")))
        .unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Enum(1));

    engine.write(&key, SlotValue::Enum(2), &ctx).unwrap();
    assert_eq!(obj.get_attr("e").unwrap(), Value::str("C"));
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Enum(2));
}

#[test]
fn test_enum_flag_encoding() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Value::object(&Class::new("Flags"), [("f", Value::set(["A", "C"]))]);
    let key = engine
        .set_property(
            &obj,
            "f",
            enum_property(abc(), PropOptions::new().flag(PropFlag::EnumFlag)),
        )
        .unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Flags(0b101));

    obj.set_attr("f", Value::set(["A", "ZZZ"])).unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Flags(0b001));

    engine.write(&key, SlotValue::Flags(0b101), &ctx).unwrap();
    assert_eq!(obj.get_attr("f").unwrap(), Value::set(["A", "C"]));
}

#[test]
fn test_unhashable_owner_resolved_by_identity() {
    let mut engine = engine();
    let ctx = Context::default();
    let owner = Value::list([Value::Int(10), Value::Int(20)]);
    engine
        .register(&owner, "[1]", int_property(PropOptions::new()))
        .unwrap();

    let key = engine.ensure(&owner, &[]).unwrap()["[1]"].clone();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Int(20));

    let twin = Value::list([Value::Int(10), Value::Int(20)]);
    assert!(matches!(
        engine.ensure(&twin, &["[1]"]),
        Err(EngineError::UnknownAttribute { .. })
    ));
}

#[test]
fn test_unhashable_class_instances() {
    let mut engine = engine();
    let ctx = Context::default();
    let class = Class::with_hashing("Mutable", Hashing::Unhashable);
    let obj = Value::object(&class, [("n", Value::Int(3))]);
    let key = engine
        .set_property(&obj, "n", int_property(PropOptions::new()))
        .unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Int(3));
}

#[test]
fn test_class_registration_applies_to_instances() {
    let mut engine = engine();
    let ctx = Context::default();
    let class = Class::new("CustomGroup");
    let a = Value::object(&class, [("x", Value::Int(1))]);
    let b = Value::object(&class, [("x", Value::Int(2))]);
    engine
        .register(&Value::class(&class), "x", int_property(PropOptions::new()))
        .unwrap();

    let ka = engine.ensure(&a, &["x"]).unwrap()["x"].clone();
    let kb = engine.ensure(&b, &["x"]).unwrap()["x"].clone();
    assert_ne!(ka, kb);
    assert_eq!(engine.read(&ka, &ctx).unwrap(), SlotValue::Int(1));
    assert_eq!(engine.read(&kb, &ctx).unwrap(), SlotValue::Int(2));
}

#[test]
fn test_class_owner_projects_class_attribute() {
    let mut engine = engine();
    let ctx = Context::default();
    let class = Class::new("Settings");
    class.set_attr("level", Value::Int(4));
    let owner = Value::class(&class);

    let key = engine
        .set_property(&owner, "level", int_property(PropOptions::new()))
        .unwrap();
    assert!(key.as_str().starts_with("Settings_"));
    engine.write(&key, SlotValue::Int(6), &ctx).unwrap();
    assert_eq!(class.get_attr("level"), Some(Value::Int(6)));
}

#[test]
fn test_reference_counted_record_types() {
    let config = EngineConfig {
        record_type: "First".into(),
        ..EngineConfig::default()
    };
    let mut engine = PropertyEngine::new(config).unwrap();
    let ctx = Context::default();
    let obj = Value::object(&Class::new("Hoge"), [("a", Value::Int(1))]);
    let key = engine
        .set_property(&obj, "a", int_property(PropOptions::new()))
        .unwrap();

    engine.register_record_type("Second").unwrap();
    engine.register_record_type("Third").unwrap();
    assert_eq!(engine.publisher().users(), 3);

    engine.unregister_record_type("First").unwrap();
    engine.unregister_record_type("Second").unwrap();
    let active = engine.active().unwrap();
    assert_eq!(active.type_name(), "Third");
    assert!(active.has(&key));
    engine.write(&key, SlotValue::Int(8), &ctx).unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Int(8));

    engine.unregister_record_type("Third").unwrap();
    assert!(engine.active().is_none());
    assert!(matches!(
        engine.read(&key, &ctx),
        Err(EngineError::NoActiveRecord)
    ));
}

#[test]
fn test_broker_callback_remove() {
    let mut engine = engine();
    let backing = Value::list([Value::str("a"), Value::str("b"), Value::str("c")]);
    let list = backing.clone();
    engine.broker_mut().register_remove("list_x", move |_ctx, index| {
        if let Value::List(items) = &list {
            items.write().remove(index as usize);
        }
        Ok(())
    });

    let cmd = CollectionCommand::from_params(CollectionOp::Remove, "", "list_x", 1, 0, 0);
    engine.dispatch(&Context::default(), &cmd).unwrap();
    assert_eq!(backing, Value::list([Value::str("a"), Value::str("c")]));

    let missing = CollectionCommand::callback("list_y", CollectionAction::Clear);
    assert!(matches!(
        engine.dispatch(&Context::default(), &missing),
        Err(EngineError::UnknownCallback { .. })
    ));
}

#[test]
fn test_broker_path_mode_against_context() {
    let mut engine = engine();
    let scene = Value::object(
        &Class::new("Scene"),
        [("items", Value::list([Value::Int(1), Value::Int(2)]))],
    );
    let ctx = Context::new(Value::object(&Class::new("Context"), [("scene", scene.clone())]));

    let cmd = CollectionCommand::from_params(CollectionOp::Clear, "scene.items", "", 0, 0, 0);
    engine.dispatch(&ctx, &cmd).unwrap();
    assert_eq!(scene.get_attr("items").unwrap(), Value::list([]));
}

#[test]
fn test_dynamic_items_recomputed_per_access() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Value::object(
        &Class::new("Dyn"),
        [
            ("choices", Value::list([Value::str("X"), Value::str("Y")])),
            ("pick", Value::str("Y")),
        ],
    );
    let items = EnumItems::dynamic(|owner, _ctx| {
        owner
            .get_attr("choices")
            .ok()
            .and_then(|v| v.sequence_items())
            .unwrap_or_default()
            .iter()
            .filter_map(|v| v.as_str().map(|id| EnumItem::new(id, id, "")))
            .collect()
    });
    let key = engine
        .set_property(&obj, "pick", enum_property(items, PropOptions::new()))
        .unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Enum(1));

    obj.set_attr("choices", Value::list([Value::str("Y"), Value::str("X")]))
        .unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Enum(0));
}

#[test]
fn test_dynamic_enums_fall_back_to_first_item() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Value::object(
        &Class::new("Dyn"),
        [
            ("pick", Value::str("Y")),
            ("flags", Value::set(["invalidvalue"])),
        ],
    );
    let xy = || {
        EnumItems::dynamic(|_, _| vec![EnumItem::new("X", "X", ""), EnumItem::new("Y", "Y", "")])
    };

    let pick = engine
        .set_property(&obj, "pick", enum_property(xy(), PropOptions::new().default_value("Y")))
        .unwrap();
    let flags = engine
        .set_property(
            &obj,
            "flags",
            enum_property(
                xy(),
                PropOptions::new().flag(PropFlag::EnumFlag).default_flag(["Y"]),
            ),
        )
        .unwrap();

    assert_eq!(engine.read(&pick, &ctx).unwrap(), SlotValue::Enum(1));
    // Unknown members contribute no bits
    assert_eq!(engine.read(&flags, &ctx).unwrap(), SlotValue::Flags(0));

    // Stored values outside the item list ignore the declared defaults
    obj.set_attr("pick", Value::str("gone")).unwrap();
    obj.set_attr("flags", Value::Int(7)).unwrap();
    assert_eq!(engine.read(&pick, &ctx).unwrap(), SlotValue::Enum(0));
    assert_eq!(engine.read(&flags, &ctx).unwrap(), SlotValue::Flags(0));

    obj.set_attr("flags", Value::set::<&str>([])).unwrap();
    assert_eq!(engine.read(&flags, &ctx).unwrap(), SlotValue::Flags(0));
}

#[test]
fn test_clearing_flags_reads_back_default() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Value::object(&Class::new("Flags"), [("flags", Value::set(["A", "C"]))]);
    let key = engine
        .set_property(
            &obj,
            "flags",
            enum_property(
                abc(),
                PropOptions::new().flag(PropFlag::EnumFlag).default_flag(["B"]),
            ),
        )
        .unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Flags(0b101));

    engine.write(&key, SlotValue::Flags(0), &ctx).unwrap();
    assert_eq!(obj.get_attr("flags").unwrap(), Value::set::<&str>([]));
    // An empty collection is treated like any unresolvable one
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Flags(0b010));

    obj.set_attr("flags", Value::Int(7)).unwrap();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Flags(0b010));
}

#[test]
fn test_failed_write_reports_and_preserves_state() {
    let mut engine = engine();
    let ctx = Context::default();
    let frozen = Value::tuple([Value::Bool(true), Value::Bool(false)]);
    let obj = Value::object(&Class::new("Hoge"), [("pair", frozen.clone())]);
    let key = engine
        .set_property(&obj, "pair[0]", bool_property(PropOptions::new()))
        .unwrap();

    let err = engine.write(&key, SlotValue::Bool(false), &ctx).unwrap_err();
    assert!(matches!(err, EngineError::AttributeWriteFailed { .. }));
    assert_eq!(obj.get_attr("pair").unwrap(), frozen);
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Bool(true));
    assert!(engine.registry().lookup(&obj).contains_key("pair[0]"));
}

#[test]
fn test_pass_through_registration() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Value::object(&Class::new("Hoge"), [("n", Value::Int(1))]);
    let spec = int_property(
        PropOptions::new()
            .get(|owner| {
                let n = owner.get_attr("n").ok().and_then(|v| v.as_int()).unwrap_or(0);
                Ok(SlotValue::Int(n * 10))
            })
            .set(|owner, value| {
                if let SlotValue::Int(i) = value {
                    owner
                        .set_attr("n", Value::Int(i / 10))
                        .map_err(|e| EngineError::Callback(e.to_string()))?;
                }
                Ok(())
            }),
    );
    assert!(matches!(
        engine.register(&obj, "n", spec.clone()),
        Err(EngineError::InvalidSpec { .. })
    ));
    engine.register_pass_through(&obj, "n", spec).unwrap();

    let key = engine.ensure(&obj, &["n"]).unwrap()["n"].clone();
    assert_eq!(engine.read(&key, &ctx).unwrap(), SlotValue::Int(10));
    engine.write(&key, SlotValue::Int(70), &ctx).unwrap();
    assert_eq!(obj.get_attr("n").unwrap(), Value::Int(7));
}

#[test]
fn test_bool_vector_and_element_path() {
    let mut engine = engine();
    let ctx = Context::default();
    let obj = Value::object(
        &Class::new("Hoge"),
        [("flags", Value::list([Value::Bool(true), Value::Bool(false), Value::Bool(true)]))],
    );
    engine
        .register(&obj, "flags", bool_vector_property(PropOptions::new()))
        .unwrap();
    engine
        .register(&obj, "flags[1]", bool_property(PropOptions::new()))
        .unwrap();
    let keys = engine.ensure_all(&obj).unwrap();

    engine
        .write(&keys["flags[1]"], SlotValue::Bool(true), &ctx)
        .unwrap();
    assert_eq!(
        engine.read(&keys["flags"], &ctx).unwrap(),
        SlotValue::Array(vec![SlotValue::Bool(true); 3])
    );
    assert!(Arc::strong_count(engine.publisher().installed(&keys["flags"]).unwrap()) >= 2);
}
