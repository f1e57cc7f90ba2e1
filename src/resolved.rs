//! Live values produced by resolving a config tree

use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The resolved form of a config value.
///
/// Primitives and maps mirror the declared shape; an on-create hook may
/// replace a value with an arbitrary [`Instance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Primitive(serde_json::Value),
    Map(IndexMap<String, Resolved>),
    Instance(Instance),
}

/// A type-erased, shared service created by an on-create hook
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Instances are equal only when they are the same allocation
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance<{}>", self.type_name)
    }
}

impl Resolved {
    pub fn null() -> Self {
        Resolved::Primitive(serde_json::Value::Null)
    }

    /// Wrap a live service
    pub fn instance<T: Any + Send + Sync>(value: T) -> Self {
        Resolved::Instance(Instance::new(value))
    }

    /// Convert JSON into a resolved tree, turning objects into maps
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(members) => Resolved::Map(
                members
                    .into_iter()
                    .map(|(k, v)| (k, Resolved::from_json(v)))
                    .collect(),
            ),
            other => Resolved::Primitive(other),
        }
    }

    pub fn as_primitive(&self) -> Option<&serde_json::Value> {
        match self {
            Resolved::Primitive(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_primitive().and_then(serde_json::Value::as_i64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_primitive().and_then(serde_json::Value::as_str)
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Resolved>> {
        match self {
            Resolved::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Resolved::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Field lookup on a resolved map
    pub fn get(&self, field: &str) -> Option<&Resolved> {
        self.as_map().and_then(|map| map.get(field))
    }

    /// Downcast an instance value to a concrete service type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.as_instance().and_then(Instance::downcast::<T>)
    }

    /// Short description for log lines
    pub(crate) fn describe(&self) -> String {
        match self {
            Resolved::Primitive(v) => v.to_string(),
            Resolved::Map(map) => format!("map({} fields)", map.len()),
            Resolved::Instance(instance) => format!("{instance:?}"),
        }
    }
}

impl From<serde_json::Value> for Resolved {
    fn from(v: serde_json::Value) -> Self {
        Resolved::Primitive(v)
    }
}

impl From<Instance> for Resolved {
    fn from(instance: Instance) -> Self {
        Resolved::Instance(instance)
    }
}

macro_rules! primitive_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Resolved {
                fn from(v: $ty) -> Self {
                    Resolved::Primitive(serde_json::Value::from(v))
                }
            }
        )*
    };
}

primitive_from!(bool, i32, i64, u32, u64, f64, String, &str);
