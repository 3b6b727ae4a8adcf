use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

const SCENE: &str = r#"
classes:
  - name: CustomGroup
objects:
  - name: group
    class: CustomGroup
    attrs:
      int_value: 7
      str_value: 100
      int_array: !tuple [1, 2]
      enum_flag: [A, C]
      items: [1, 2, 3]
properties:
  - owner: class:CustomGroup
    path: int_value
    kind: int
  - owner: group
    path: str_value
    kind: string
    default: fallback
  - owner: group
    path: int_array
    kind: int_vector
    size: 2
  - owner: group
    path: enum_flag
    kind: enum_flag
    items: [A, B, C]
commands:
  - op: move
    data_path: group.items
    index_from: 0
    index_to: 2
"#;

#[test]
fn demo_prints_every_slot() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    #[allow(deprecated)]
    Command::cargo_bin("propslot")?
        .current_dir(dir.path())
        .args(["demo", "--passes", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PyCustomProperty at custom_props"))
        .stdout(predicate::str::contains("enum_flag_func"))
        .stdout(predicate::str::contains("0b10"));

    Ok(())
}

#[test]
fn demo_json_reports_fallbacks() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    #[allow(deprecated)]
    let assert = Command::cargo_bin("propslot")?
        .current_dir(dir.path())
        .args(["demo", "--passes", "3", "--json"])
        .assert()
        .success();

    let payload: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(payload["record_type"], "PyCustomProperty");
    assert_eq!(payload["passes"], 3);
    assert_eq!(payload["item_count"], 3);

    let slots = payload["slots"].as_array().ok_or("slots missing")?;
    let value_of = |attribute: &str| {
        slots
            .iter()
            .find(|s| s["attribute"] == attribute)
            .map(|s| s["value"].clone())
    };
    assert_eq!(value_of("str_value"), Some(Value::from("")));
    assert_eq!(value_of("int_array"), Some(serde_json::json!([0, 0])));
    assert_eq!(value_of("enum_flag"), Some(Value::from(3)));

    let items = payload["items"].as_array().ok_or("items missing")?;
    assert_eq!(items.len(), 2);

    Ok(())
}

#[test]
fn inspect_scene_prints_slots() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("scene.yml"), SCENE)?;

    #[allow(deprecated)]
    let assert = Command::cargo_bin("propslot")?
        .current_dir(dir.path())
        .args(["inspect", "scene.yml", "--json"])
        .assert()
        .success();

    let payload: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(payload["record_types"], serde_json::json!(["PyCustomProperty"]));
    assert_eq!(payload["commands"][0]["op"], "wm.collection_move");
    assert_eq!(payload["commands"][0]["label"], "Collection Move");
    let group = payload["owners"]["group"]
        .as_array()
        .ok_or("group missing")?;
    assert_eq!(group.len(), 4);

    let value_of = |attribute: &str| {
        group
            .iter()
            .find(|s| s["attribute"] == attribute)
            .map(|s| s["value"].clone())
    };
    assert_eq!(value_of("int_value"), Some(Value::from(7)));
    assert_eq!(value_of("str_value"), Some(Value::from("fallback")));
    assert_eq!(value_of("int_array"), Some(serde_json::json!([1, 2])));
    assert_eq!(value_of("enum_flag"), Some(Value::from(0b101)));

    Ok(())
}

#[test]
fn inspect_text_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("scene.yml"), SCENE)?;

    #[allow(deprecated)]
    Command::cargo_bin("propslot")?
        .current_dir(dir.path())
        .args(["inspect", "scene.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("record types: PyCustomProperty"))
        .stdout(predicate::str::contains("applied Collection Move (wm.collection_move)"))
        .stdout(predicate::str::contains("group:"))
        .stdout(predicate::str::contains("_int_value = 7 (INT)"));

    Ok(())
}

#[test]
fn inspect_rejects_bad_scene() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("scene.yml"),
        "objects:\n  - name: a\n    class: Missing\n",
    )?;

    #[allow(deprecated)]
    Command::cargo_bin("propslot")?
        .current_dir(dir.path())
        .args(["inspect", "scene.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown class 'Missing'"));

    Ok(())
}

#[test]
fn explicit_config_must_exist_and_parse() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    #[allow(deprecated)]
    Command::cargo_bin("propslot")?
        .current_dir(dir.path())
        .args(["--config", "missing.yml", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));

    fs::write(dir.path().join("propslot.yml"), "record_typo: Panel\n")?;

    #[allow(deprecated)]
    Command::cargo_bin("propslot")?
        .current_dir(dir.path())
        .arg("demo")
        .assert()
        .failure();

    fs::write(dir.path().join("propslot.yml"), "record_type: Panel\n")?;

    #[allow(deprecated)]
    Command::cargo_bin("propslot")?
        .current_dir(dir.path())
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Panel at custom_props"));

    Ok(())
}
