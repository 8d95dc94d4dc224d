use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{StepError, StepResult};
use crate::paths;

pub const IDENTIFIER_KEY: &str = "identifier";
pub const RECURSE_KEY: &str = "Recurse Directory Structure";
pub const LOCATION_KEY: &str = "location";
pub const PREVIOUS_LOCATION_KEY: &str = "previous_location";

/// The persisted configuration of a directory copy step.
///
/// `location` and `previous_location` are portable paths relative to the
/// step's base location.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StepConfig {
    pub identifier: String,
    #[serde(rename = "Recurse Directory Structure")]
    pub recurse: bool,
    pub location: String,
    pub previous_location: String,
    /// Keys this version does not know about, kept so they are written back.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            recurse: true,
            location: String::new(),
            previous_location: String::new(),
            extra: Map::new(),
        }
    }
}

impl StepConfig {
    /// Overlays the keys present in `overlay` onto this record. Keys missing
    /// from `overlay` keep their current values.
    pub fn merged_with(&self, overlay: Map<String, Value>) -> StepResult<Self> {
        let mut base = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(source) => return Err(StepError::json("encode configuration", source)),
        };
        base.extend(overlay);
        serde_json::from_value(Value::Object(base))
            .map_err(|source| StepError::json("decode configuration", source))
    }

    /// Builds a record from configuration handed over by the host, e.g. for
    /// workflows written against an older schema. Absolute values of the
    /// path keys are made relative to `base`; the identifier is left empty.
    pub fn from_host_configuration(raw: &Map<String, Value>, base: &Path) -> Self {
        let mut config = Self::default();
        if let Some(recurse) = raw.get(RECURSE_KEY).and_then(Value::as_bool) {
            config.recurse = recurse;
        }
        for (key, slot) in [
            (LOCATION_KEY, &mut config.location),
            (PREVIOUS_LOCATION_KEY, &mut config.previous_location),
        ] {
            if let Some(value) = raw.get(key).and_then(Value::as_str) {
                *slot = portable_relative(value, base);
            }
        }
        config
    }

    /// The path-valued fields, which move with the step's base location.
    pub fn relative_paths_mut(&mut self) -> [&mut String; 2] {
        [&mut self.location, &mut self.previous_location]
    }

    /// Pretty JSON with sorted keys and four-space indentation.
    pub fn to_json(&self) -> StepResult<String> {
        let value = serde_json::to_value(self)
            .map_err(|source| StepError::json("encode configuration", source))?;
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|source| StepError::json("write configuration", source))?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

fn portable_relative(value: &str, base: &Path) -> String {
    let native = paths::to_native(value);
    let path = Path::new(&native);
    if path.is_absolute() {
        paths::to_portable(&paths::relative_to(path, base).to_string_lossy())
    } else {
        paths::to_portable(&native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn defaults_recurse_with_empty_paths() {
        let config = StepConfig::default();
        assert!(config.recurse);
        assert!(config.identifier.is_empty());
        assert!(config.location.is_empty());
        assert!(config.previous_location.is_empty());
    }

    #[test]
    fn json_uses_the_saved_key_names_sorted() -> StepResult<()> {
        let config = StepConfig {
            identifier: "copy".into(),
            recurse: false,
            location: "../out".into(),
            previous_location: "../prev".into(),
            extra: Map::new(),
        };
        let expected = "{\n    \"Recurse Directory Structure\": false,\n    \"identifier\": \"copy\",\n    \"location\": \"../out\",\n    \"previous_location\": \"../prev\"\n}";
        assert_eq!(config.to_json()?, expected);
        Ok(())
    }

    #[test]
    fn merge_keeps_fields_missing_from_overlay() -> StepResult<()> {
        let current = StepConfig {
            identifier: "copy".into(),
            previous_location: "kept".into(),
            ..StepConfig::default()
        };
        let merged = current.merged_with(object(json!({
            "identifier": "renamed",
            "Recurse Directory Structure": false,
            "location": "out",
        })))?;
        assert_eq!(merged.identifier, "renamed");
        assert!(!merged.recurse);
        assert_eq!(merged.location, "out");
        assert_eq!(merged.previous_location, "kept");
        Ok(())
    }

    #[test]
    fn merge_carries_unknown_keys_through() -> StepResult<()> {
        let merged = StepConfig::default().merged_with(object(json!({ "colour": "blue" })))?;
        assert_eq!(merged.extra.get("colour"), Some(&json!("blue")));
        assert!(merged.to_json()?.contains("\"colour\": \"blue\""));
        Ok(())
    }

    #[test]
    fn merge_rejects_mistyped_values() {
        let result = StepConfig::default().merged_with(object(json!({ "location": 7 })));
        assert!(matches!(result, Err(StepError::Json { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn host_configuration_relativizes_absolute_paths() {
        let raw = object(json!({
            "identifier": "ignored",
            "location": "/w/out",
            "previous_location": "already/relative",
            "Recurse Directory Structure": false,
        }));
        let config = StepConfig::from_host_configuration(&raw, Path::new("/w/step"));
        assert_eq!(config.identifier, "");
        assert_eq!(config.location, "../out");
        assert_eq!(config.previous_location, "already/relative");
        assert!(!config.recurse);
    }

    #[test]
    fn host_configuration_falls_back_to_defaults() {
        let config = StepConfig::from_host_configuration(&Map::new(), Path::new("base"));
        assert_eq!(config, StepConfig::default());
    }
}
