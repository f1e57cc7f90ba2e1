use crate::error::{Result, WireupError};
use std::fmt;

/// Member name that marks a JSON object as a reference: `{"$ref": "db"}`
pub const REF_MARKER: &str = "$ref";

/// An indirection to another top-level config key.
///
/// The target does not have to exist when the reference is created, only
/// when the system holding it is started.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ref {
    key: String,
}

impl Ref {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Like [`Ref::new`], but rejects an empty target key
    pub fn parse(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(WireupError::invalid_reference(
                "reference target must be a non-empty key",
            ));
        }
        Ok(Self { key })
    }

    /// The config key this reference points at
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref({})", self.key)
    }
}
