use crate::error::{Result, WireupError};
use std::fmt;

/// One step on a [`Path`]
///
/// Keys and field locations are kept apart, so a top-level key that happens
/// to contain a dot never collides with a nested field of the same spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dep {
    /// A top-level key reached through a reference
    Key(String),
    /// The dotted location of a nested field (`server.db`, `server.db.pool`)
    Field(String),
}

impl Dep {
    /// The identifier as written, without its kind
    pub fn as_str(&self) -> &str {
        match self {
            Dep::Key(name) | Dep::Field(name) => name,
        }
    }
}

impl fmt::Display for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The chain of dependencies from an entry point to the value being resolved.
///
/// Only used for cycle detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    deps: Vec<Dep>,
}

impl Path {
    /// Create an empty path, as used for an entry point
    pub fn new() -> Self {
        Self { deps: Vec::new() }
    }

    /// Extend the path with `dep`, failing if it is already on it
    pub fn append(&self, dep: Dep) -> Result<Path> {
        if self.contains(&dep) {
            return Err(WireupError::cycle(self.iter(), dep.as_str()));
        }
        let mut deps = Vec::with_capacity(self.deps.len() + 1);
        deps.extend(self.deps.iter().cloned());
        deps.push(dep);
        Ok(Path { deps })
    }

    /// Check whether `dep` has already been walked
    pub fn contains(&self, dep: &Dep) -> bool {
        self.deps.contains(dep)
    }

    /// The most recently appended identifier
    pub fn last(&self) -> Option<&str> {
        self.deps.last().map(Dep::as_str)
    }

    /// Iterate over the identifiers from the entry point onwards
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.deps.iter().map(Dep::as_str)
    }

    /// Get the number of steps walked
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dep) in self.deps.iter().enumerate() {
            if i > 0 {
                f.write_str("->")?;
            }
            write!(f, "{dep}")?;
        }
        Ok(())
    }
}
