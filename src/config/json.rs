//! Loading config trees from JSON
//!
//! Objects become nested maps, except for objects of the exact shape
//! `{"$ref": "<key>"}`, which become references. Everything else is kept as
//! an opaque primitive.

use super::{Config, REF_MARKER, Ref, Value};
use crate::error::{Result, WireupError};
use serde_json::Value as Json;
use std::path::Path;

impl Config {
    /// Build a config from a parsed JSON document. The root must be an object.
    pub fn from_json(json: Json) -> Result<Self> {
        match json {
            Json::Object(members) => members
                .into_iter()
                .map(|(key, value)| Ok::<_, WireupError>((key, Value::from_json(value)?)))
                .collect(),
            other => Err(WireupError::ConfigNotAMap {
                found: json_type_name(&other).to_string(),
            }),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Self::from_json(serde_json::from_str(source)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading config from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }
}

impl Value {
    pub fn from_json(json: Json) -> Result<Self> {
        match json {
            Json::Object(mut members) => match members.remove(REF_MARKER) {
                Some(Json::String(key)) if members.is_empty() => Ok(Value::Ref(Ref::parse(key)?)),
                Some(_) if !members.is_empty() => Err(WireupError::invalid_reference(format!(
                    "a '{REF_MARKER}' object must have no other members"
                ))),
                Some(other) => Err(WireupError::invalid_reference(format!(
                    "'{REF_MARKER}' must be a string, not {}",
                    json_type_name(&other)
                ))),
                None => Config::from_json(Json::Object(members)).map(Value::Map),
            },
            primitive => Ok(Value::Primitive(primitive)),
        }
    }
}

fn json_type_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::reference;
    use serde_json::json;

    #[test]
    fn test_load_nested_config_with_refs() {
        let config = Config::from_json(json!({
            "server": {"port": 8080, "db": {"$ref": "db"}},
            "db": {"url": "postgres://localhost"},
            "tags": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["server", "db", "tags"]);
        let server = config.get("server").and_then(Value::as_map).unwrap();
        assert_eq!(server.get("port"), Some(&Value::from(8080)));
        assert_eq!(server.get("db"), Some(&reference("db")));
        assert!(matches!(
            config.get("tags"),
            Some(Value::Primitive(Json::Array(_)))
        ));
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        let err = Config::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, WireupError::ConfigNotAMap { .. }));
        assert_eq!(err.to_string(), "Config root must be a map, not an array");
    }

    #[test]
    fn test_malformed_refs_are_rejected() {
        for bad in [
            json!({"a": {"$ref": 3}}),
            json!({"a": {"$ref": ""}}),
            json!({"a": {"$ref": "b", "extra": 1}}),
        ] {
            let err = Config::from_json(bad).unwrap_err();
            assert!(matches!(err, WireupError::InvalidReference { .. }), "{err}");
        }
    }

    #[test]
    fn test_from_str_and_deserialize() {
        let source = r#"{"main": {"b": 1, "a": {"$ref": "x"}}, "x": true}"#;
        let config = Config::from_json_str(source).unwrap();
        let via_serde: Config = serde_json::from_str(source).unwrap();
        assert_eq!(config, via_serde);

        // Member order follows the document, not the alphabet
        let main = config.get("main").and_then(Value::as_map).unwrap();
        assert_eq!(main.keys().collect::<Vec<_>>(), vec!["b", "a"]);

        assert!(matches!(
            Config::from_json_str("{not json"),
            Err(WireupError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, WireupError::Io(_)));
    }
}
