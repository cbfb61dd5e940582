//! Tagged value model for the installer document.
//!
//! `ConfigValue` keeps the native type of every scalar so a document read
//! from YAML can be written back without turning `true` into `"true"` or
//! `3` into `3.0`. Mappings are `IndexMap`s so key order survives both the
//! YAML and the JSON side.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};

/// Ordered mapping from keys to values.
pub type Mapping = IndexMap<String, ConfigValue>;

/// A single node of the installer document.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(Mapping),
}

impl ConfigValue {
    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Int(_) | ConfigValue::UInt(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Sequence(_) => "sequence",
            ConfigValue::Mapping(_) => "mapping",
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigValue::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Int(i) => serializer.serialize_i64(*i),
            ConfigValue::UInt(u) => serializer.serialize_u64(*u),
            ConfigValue::Float(f) => serializer.serialize_f64(*f),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Mapping(map) => serialize_mapping(map, serializer),
        }
    }
}

fn serialize_mapping<S: Serializer>(
    map: &Mapping,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (key, value) in map {
        out.serialize_entry(key, value)?;
    }
    out.end()
}

impl TryFrom<YamlValue> for ConfigValue {
    type Error = Error;

    fn try_from(value: YamlValue) -> Result<Self> {
        match value {
            YamlValue::Null => Ok(ConfigValue::Null),
            YamlValue::Bool(b) => Ok(ConfigValue::Bool(b)),
            YamlValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ConfigValue::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(ConfigValue::UInt(u))
                } else {
                    n.as_f64()
                        .map(ConfigValue::Float)
                        .ok_or_else(|| Error::parse(format!("unsupported number {}", n)))
                }
            }
            YamlValue::String(s) => Ok(ConfigValue::String(s)),
            YamlValue::Sequence(items) => items
                .into_iter()
                .map(ConfigValue::try_from)
                .collect::<Result<Vec<_>>>()
                .map(ConfigValue::Sequence),
            YamlValue::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    let key = mapping_key(key)?;
                    let value = ConfigValue::try_from(value)?;
                    // `1` and `'1'` are distinct YAML keys but share a text form.
                    if out.contains_key(&key) {
                        return Err(Error::parse(format!(
                            "duplicate key `{}` after key normalisation",
                            key
                        )));
                    }
                    out.insert(key, value);
                }
                Ok(ConfigValue::Mapping(out))
            }
            YamlValue::Tagged(tagged) => Err(Error::parse(format!(
                "tagged value `{}` is not supported",
                tagged.tag
            ))),
        }
    }
}

/// Scalar keys are stored by their textual form; complex keys are rejected.
fn mapping_key(key: YamlValue) -> Result<String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        other => Err(Error::parse(format!(
            "unsupported mapping key: {:?}",
            other
        ))),
    }
}

/// Root of the installer document: an ordered mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    entries: Mapping,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(entries: Mapping) -> Self {
        Self { entries }
    }

    pub fn entries_mut(&mut self) -> &mut Mapping {
        &mut self.entries
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ConfigDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_mapping(&self.entries, serializer)
    }
}

impl TryFrom<YamlValue> for ConfigDocument {
    type Error = Error;

    fn try_from(value: YamlValue) -> Result<Self> {
        match ConfigValue::try_from(value)? {
            // An empty file parses as null.
            ConfigValue::Null => Ok(Self::new()),
            ConfigValue::Mapping(entries) => Ok(Self { entries }),
            other => Err(Error::parse(format!(
                "document root must be a mapping, found {}",
                other.kind()
            ))),
        }
    }
}
