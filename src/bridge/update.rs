//! Partial updates to the installer document.

use serde_json::Value as JsonValue;

use crate::bridge::coerce::coerce;
use crate::document::{ConfigDocument, ConfigValue, Mapping};
use crate::error::{Error, Result};

/// Key paths and their new values, in payload order.
///
/// A key is either a top-level key or a dotted path (`controller.namespace`)
/// into nested mappings.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigUpdate {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigUpdate {
    /// Key paths in payload order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Fold every entry into `document`.
    ///
    /// Existing keys keep their position; new keys are appended.
    pub fn apply_to(self, document: &mut ConfigDocument) -> Result<()> {
        for (path, value) in self.entries {
            set_path(document.entries_mut(), &path, &path, value)?;
        }
        Ok(())
    }
}

impl TryFrom<JsonValue> for ConfigUpdate {
    type Error = Error;

    fn try_from(payload: JsonValue) -> Result<Self> {
        let members = match payload {
            JsonValue::Object(members) => members,
            other => {
                return Err(Error::validation(format!(
                    "update payload must be a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut entries = Vec::with_capacity(members.len());
        for (key, value) in members {
            if key.is_empty() {
                return Err(Error::validation("update keys must not be empty"));
            }
            entries.push((key, coerce(value)));
        }
        Ok(Self { entries })
    }
}

/// Set `path` inside `map`.
///
/// A key that exists verbatim wins over its dotted reading, so documents
/// with literal dots in key names can still be updated.
fn set_path(map: &mut Mapping, full: &str, path: &str, value: ConfigValue) -> Result<()> {
    if map.contains_key(path) {
        map.insert(path.to_string(), value);
        return Ok(());
    }

    let Some((head, rest)) = path.split_once('.') else {
        map.insert(path.to_string(), value);
        return Ok(());
    };
    if head.is_empty() || rest.is_empty() {
        return Err(Error::validation(format!(
            "key path `{}` has an empty segment",
            full
        )));
    }

    let child = map
        .entry(head.to_string())
        .or_insert_with(|| ConfigValue::Mapping(Mapping::new()));
    match child {
        ConfigValue::Mapping(inner) => set_path(inner, full, rest, value),
        other => Err(Error::validation(format!(
            "cannot set `{}`: `{}` is a {}, not a mapping",
            full,
            head,
            other.kind()
        ))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
