//! Declarative configuration trees
//!
//! A [`Config`] maps top-level keys to [`Value`]s. A value is either an
//! opaque primitive (arrays included), a [`Ref`] to another top-level key,
//! or a nested [`Config`] whose fields are resolved in declared order.
//!
//! ```
//! use wireup::config::{Config, Value};
//! use wireup::reference;
//!
//! let config = Config::new()
//!     .with("main", Config::new().with("foo", 1).with("bar", reference("test")))
//!     .with("test", 2);
//!
//! assert!(config.get("main").is_some_and(Value::is_map));
//! ```

mod json;
mod reference;

pub use reference::{REF_MARKER, Ref};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// An insertion-ordered map of config keys to values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    entries: IndexMap<String, Value>,
}

/// A single node in a config tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Passed through resolution unchanged. Arrays are never traversed.
    Primitive(serde_json::Value),
    /// Resolved by starting the target key
    Ref(Ref),
    /// Resolved field by field, in declared order
    Map(Config),
}

impl Config {
    /// Create an empty config
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one for that key.
    ///
    /// Replacing a key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Get the declared value of `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over the keys in declared order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over key/value pairs in declared order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get the number of top-level keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Config::from_json(json).map_err(serde::de::Error::custom)
    }
}

impl Value {
    pub fn null() -> Self {
        Value::Primitive(serde_json::Value::Null)
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// The target key if this value is a reference
    pub fn as_ref_target(&self) -> Option<&str> {
        match self {
            Value::Ref(r) => Some(r.key()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Config> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<Ref> for Value {
    fn from(r: Ref) -> Self {
        Value::Ref(r)
    }
}

impl From<Config> for Value {
    fn from(map: Config) -> Self {
        Value::Map(map)
    }
}

macro_rules! primitive_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Primitive(serde_json::Value::from(v))
                }
            }
        )*
    };
}

primitive_from!(bool, i32, i64, u32, u64, f64, String, &str, Vec<serde_json::Value>);

/// Shorthand for a reference value pointing at `key`
pub fn reference(key: impl Into<String>) -> Value {
    Value::Ref(Ref::new(key))
}
