use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WireupError>;

/// The lifecycle phase a hook belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    Create,
    Destroy,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Create => f.write_str("on-create"),
            HookPhase::Destroy => f.write_str("on-destroy"),
        }
    }
}

/// Coarse classification of a [`WireupError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A reference chain revisited a key on the current resolution path
    Cycle,
    /// A user-supplied hook returned an error
    Hook,
    /// The caller broke an API contract (bad config, bad state, duplicate hook)
    ContractViolation,
}

#[derive(Debug, Error)]
pub enum WireupError {
    #[error("Circular refs are not allowed: {chain}")]
    Cycle { chain: String },

    #[error("{phase} hook failed for '{key}': {source}")]
    HookFailed {
        key: String,
        phase: HookPhase,
        #[source]
        source: anyhow::Error,
    },

    #[error("Key not found in config: {key}")]
    MissingKey { key: String },

    #[error("Invalid reference: {message}")]
    InvalidReference { message: String },

    #[error("Config root must be a map, not {found}")]
    ConfigNotAMap { found: String },

    #[error("Multiple {phase} hooks cannot be added to '{key}'")]
    DuplicateHook { key: String, phase: HookPhase },

    #[error("There must be at least one entry point")]
    NoEntryPoints,

    #[error("Cannot {operation} a system that is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

impl WireupError {
    /// Create a cycle error from the path walked so far and the repeated dependency
    pub fn cycle<'a>(chain: impl IntoIterator<Item = &'a str>, dep: &str) -> Self {
        let mut parts: Vec<&str> = chain.into_iter().collect();
        parts.push(dep);
        Self::Cycle {
            chain: parts.join("->"),
        }
    }

    /// Create a hook failure error
    pub fn hook_failed(key: impl Into<String>, phase: HookPhase, source: anyhow::Error) -> Self {
        Self::HookFailed {
            key: key.into(),
            phase,
            source,
        }
    }

    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self::InvalidReference {
            message: message.into(),
        }
    }

    pub fn invalid_state(operation: &'static str, state: impl fmt::Display) -> Self {
        Self::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WireupError::Cycle { .. } => ErrorKind::Cycle,
            WireupError::HookFailed { .. } => ErrorKind::Hook,
            WireupError::MissingKey { .. }
            | WireupError::InvalidReference { .. }
            | WireupError::ConfigNotAMap { .. }
            | WireupError::DuplicateHook { .. }
            | WireupError::NoEntryPoints
            | WireupError::InvalidState { .. }
            | WireupError::Json(_)
            | WireupError::Io(_) => ErrorKind::ContractViolation,
        }
    }
}
