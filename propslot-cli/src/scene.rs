//! YAML scene files: classes, named objects and property declarations.
//!
//! ```yaml
//! classes:
//!   - name: CustomGroup
//!     hashing: identity
//! objects:
//!   - name: group
//!     class: CustomGroup
//!     attrs:
//!       int_value: 1
//!       int_array: !tuple [1, 2, 3]
//!       enum_flag: !set [A, B]
//! properties:
//!   - owner: class:CustomGroup
//!     path: int_value
//!     kind: int
//! ```
//!
//! `!tuple` and `!set` select tuple and set containers, `!ref name` refers to
//! an object declared earlier in the file.

use anyhow::{anyhow, bail, Context as _, Result};
use propslot_core::{
    bool_property, bool_vector_property, enum_property, float_property, float_vector_property,
    int_property, int_vector_property, string_property, string_vector_property,
    CollectionCommand, CollectionOp, Class, ClassRef, DescriptorSpec, EnumItem, Hashing, Key,
    PropFlag, PropOptions, Value,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    #[serde(default)]
    classes: Vec<ClassDecl>,
    #[serde(default)]
    objects: Vec<ObjectDecl>,
    #[serde(default)]
    properties: Vec<PropertyDecl>,
    #[serde(default)]
    commands: Vec<CommandDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassDecl {
    name: String,
    #[serde(default)]
    hashing: HashingDecl,
    #[serde(default)]
    attrs: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum HashingDecl {
    #[default]
    Identity,
    Fields,
    Unhashable,
}

impl From<HashingDecl> for Hashing {
    fn from(decl: HashingDecl) -> Self {
        match decl {
            HashingDecl::Identity => Hashing::Identity,
            HashingDecl::Fields => Hashing::Fields,
            HashingDecl::Unhashable => Hashing::Unhashable,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ObjectDecl {
    name: String,
    /// Instance of a declared class; a bare value when absent
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    attrs: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    value: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindDecl {
    Bool,
    Int,
    Float,
    String,
    BoolVector,
    IntVector,
    FloatVector,
    StringVector,
    Enum,
    EnumFlag,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ItemDecl {
    Id(String),
    Full(Vec<String>),
}

impl ItemDecl {
    fn to_item(&self) -> Result<EnumItem> {
        match self {
            ItemDecl::Id(id) => Ok(EnumItem::new(id.as_str(), id.as_str(), "")),
            ItemDecl::Full(parts) => match parts.as_slice() {
                [id] => Ok(EnumItem::new(id.as_str(), id.as_str(), "")),
                [id, name] => Ok(EnumItem::new(id.as_str(), name.as_str(), "")),
                [id, name, description] => Ok(EnumItem::new(
                    id.as_str(),
                    name.as_str(),
                    description.as_str(),
                )),
                _ => bail!("enum item must have 1 to 3 fields, got {}", parts.len()),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDecl {
    /// Object name, or `class:<ClassName>` for a class owner
    pub owner: String,
    pub path: String,
    kind: KindDecl,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    size: Option<usize>,
    #[serde(default)]
    default: Option<serde_yaml::Value>,
    #[serde(default)]
    items: Vec<ItemDecl>,
    #[serde(default)]
    flags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandDecl {
    op: OpDecl,
    #[serde(default)]
    data_path: String,
    #[serde(default)]
    index: i64,
    #[serde(default)]
    index_from: i64,
    #[serde(default)]
    index_to: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OpDecl {
    Remove,
    Move,
    Clear,
}

/// A loaded scene
#[derive(Debug)]
pub struct Scene {
    classes: BTreeMap<String, ClassRef>,
    objects: Vec<(String, Value)>,
    properties: Vec<PropertyDecl>,
    commands: Vec<CollectionCommand>,
}

impl Scene {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid scene file {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let file: SceneFile = serde_yaml::from_str(contents).context("Failed to parse YAML")?;

        let mut classes = BTreeMap::new();
        for decl in &file.classes {
            if classes.contains_key(&decl.name) {
                bail!("class '{}' declared twice", decl.name);
            }
            classes.insert(
                decl.name.clone(),
                Class::with_hashing(decl.name.as_str(), decl.hashing.into()),
            );
        }

        let mut scene = Scene {
            classes,
            objects: Vec::new(),
            properties: file.properties,
            commands: Vec::new(),
        };

        for decl in &file.classes {
            let class = scene.class(&decl.name)?;
            for (attr, raw) in &decl.attrs {
                class.set_attr(attr.as_str(), scene.convert(raw)?);
            }
        }

        for decl in &file.objects {
            if scene.objects.iter().any(|(name, _)| *name == decl.name) {
                bail!("object '{}' declared twice", decl.name);
            }
            let value = scene
                .build_object(decl)
                .with_context(|| format!("object '{}'", decl.name))?;
            scene.objects.push((decl.name.clone(), value));
        }

        scene.commands = file
            .commands
            .iter()
            .map(|c| {
                let op = match c.op {
                    OpDecl::Remove => CollectionOp::Remove,
                    OpDecl::Move => CollectionOp::Move,
                    OpDecl::Clear => CollectionOp::Clear,
                };
                if c.data_path.is_empty() {
                    bail!("scene command {} needs a data_path", op);
                }
                Ok(CollectionCommand::from_params(
                    op,
                    &c.data_path,
                    "",
                    c.index,
                    c.index_from,
                    c.index_to,
                ))
            })
            .collect::<Result<_>>()?;

        Ok(scene)
    }

    fn build_object(&self, decl: &ObjectDecl) -> Result<Value> {
        match (&decl.class, &decl.value) {
            (Some(_), Some(_)) => bail!("an object takes either 'class' or 'value', not both"),
            (None, Some(raw)) => {
                if !decl.attrs.is_empty() {
                    bail!("a bare value cannot carry attrs");
                }
                self.convert(raw)
            }
            (Some(class), None) => {
                let class = self.class(class)?;
                let obj = class.instantiate();
                for (attr, raw) in &decl.attrs {
                    obj.set_attr(attr, self.convert(raw)?)?;
                }
                Ok(obj)
            }
            (None, None) => bail!("an object needs 'class' or 'value'"),
        }
    }

    fn class(&self, name: &str) -> Result<ClassRef> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("unknown class '{}'", name))
    }

    fn object(&self, name: &str) -> Result<Value> {
        self.objects
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| anyhow!("unknown object '{}'", name))
    }

    /// Resolve an owner reference: an object name or `class:<Name>`
    pub fn owner(&self, reference: &str) -> Result<Value> {
        match reference.strip_prefix("class:") {
            Some(class) => Ok(Value::class(&self.class(class)?)),
            None => self.object(reference),
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.objects.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn properties(&self) -> &[PropertyDecl] {
        &self.properties
    }

    pub fn commands(&self) -> &[CollectionCommand] {
        &self.commands
    }

    /// Context root exposing every object as an attribute
    pub fn context_root(&self) -> Value {
        let root = Class::new("Context");
        Value::object(
            &root,
            self.objects.iter().map(|(n, v)| (n.clone(), v.clone())),
        )
    }

    fn convert(&self, raw: &serde_yaml::Value) -> Result<Value> {
        use serde_yaml::Value as Yaml;
        Ok(match raw {
            Yaml::Null => Value::None,
            Yaml::Bool(b) => Value::Bool(*b),
            Yaml::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(
                    n.as_f64()
                        .ok_or_else(|| anyhow!("unsupported number {}", n))?,
                ),
            },
            Yaml::String(s) => Value::Str(s.clone()),
            Yaml::Sequence(items) => Value::list(
                items
                    .iter()
                    .map(|v| self.convert(v))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Yaml::Mapping(map) => Value::dict(
                map.iter()
                    .map(|(k, v)| Ok((yaml_key(k)?, self.convert(v)?)))
                    .collect::<Result<Vec<(Key, Value)>>>()?,
            ),
            Yaml::Tagged(tagged) => {
                if tagged.tag == "tuple" {
                    let items = tagged
                        .value
                        .as_sequence()
                        .ok_or_else(|| anyhow!("!tuple expects a sequence"))?;
                    Value::tuple(
                        items
                            .iter()
                            .map(|v| self.convert(v))
                            .collect::<Result<Vec<_>>>()?,
                    )
                } else if tagged.tag == "set" {
                    let items = tagged
                        .value
                        .as_sequence()
                        .ok_or_else(|| anyhow!("!set expects a sequence"))?;
                    Value::set(items.iter().map(yaml_key).collect::<Result<Vec<_>>>()?)
                } else if tagged.tag == "ref" {
                    let name = tagged
                        .value
                        .as_str()
                        .ok_or_else(|| anyhow!("!ref expects an object name"))?;
                    self.owner(name)?
                } else {
                    bail!("unsupported tag {}", tagged.tag)
                }
            }
        })
    }

    /// Build the descriptor for a property declaration
    pub fn descriptor(&self, decl: &PropertyDecl) -> Result<DescriptorSpec> {
        let mut options = PropOptions::new();
        if let Some(name) = &decl.name {
            options = options.name(name.as_str());
        }
        if let Some(description) = &decl.description {
            options = options.description(description.as_str());
        }
        if let Some(size) = decl.size {
            options = options.size(size);
        }
        if let Some(default) = &decl.default {
            options.default = Some(self.convert(default)?);
        }
        for flag in &decl.flags {
            options = options.flag(parse_flag(flag)?);
        }

        let items = || -> Result<Vec<EnumItem>> {
            decl.items
                .iter()
                .map(ItemDecl::to_item)
                .collect()
        };

        Ok(match decl.kind {
            KindDecl::Bool => bool_property(options),
            KindDecl::Int => int_property(options),
            KindDecl::Float => float_property(options),
            KindDecl::String => string_property(options),
            KindDecl::BoolVector => bool_vector_property(options),
            KindDecl::IntVector => int_vector_property(options),
            KindDecl::FloatVector => float_vector_property(options),
            KindDecl::StringVector => string_vector_property(options),
            KindDecl::Enum => enum_property(items()?, options),
            KindDecl::EnumFlag => enum_property(items()?, options.flag(PropFlag::EnumFlag)),
        })
    }
}

fn yaml_key(raw: &serde_yaml::Value) -> Result<Key> {
    match raw {
        serde_yaml::Value::String(s) => Ok(Key::Str(s.clone())),
        serde_yaml::Value::Number(n) => n
            .as_i64()
            .map(Key::Int)
            .ok_or_else(|| anyhow!("key {} is not an integer", n)),
        other => bail!("unsupported key {:?}", other),
    }
}

fn parse_flag(flag: &str) -> Result<PropFlag> {
    Ok(match flag.to_ascii_uppercase().as_str() {
        "SKIP_SAVE" => PropFlag::SkipSave,
        "HIDDEN" => PropFlag::Hidden,
        "ANIMATABLE" => PropFlag::Animatable,
        "ENUM_FLAG" => PropFlag::EnumFlag,
        "LIBRARY_EDITABLE" => PropFlag::LibraryEditable,
        _ => bail!("unknown property flag '{}'", flag),
    })
}
