//! # Wireup
//!
//! Resolve a declarative tree of named components into live services.
//!
//! A [`Config`] maps top-level keys to values. Values can reference other
//! top-level keys; starting a key starts everything it references first,
//! and every key is created and destroyed exactly once no matter how many
//! components depend on it.
//!
//! ## Features
//!
//! - **References**: `{"$ref": "db"}` (or [`reference("db")`](reference)) wires a key into another
//! - **Lifecycle hooks**: async on-create / on-destroy hooks per key turn config into services
//! - **Memoization**: shared dependencies are created once and torn down once
//! - **Cycle detection**: circular references fail before any hook runs
//! - **Deterministic order**: hooks run in dependency order, siblings in declared order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wireup::prelude::*;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> wireup::Result<()> {
//!     let wireup = Wireup::new();
//!
//!     // 1. Register hooks
//!     wireup.on_create("db", |config: Resolved| async move {
//!         let url = config.get("url").and_then(Resolved::as_str).unwrap_or_default();
//!         anyhow::Ok(Resolved::instance(Database { url: url.to_string() }))
//!     })?;
//!     wireup.on_destroy("db", |db: Resolved| async move {
//!         if let Some(db) = db.downcast::<Database>() {
//!             tracing::info!("Closing {}", db.url);
//!         }
//!         anyhow::Ok(())
//!     })?;
//!
//!     // 2. Describe the system
//!     let config = Config::from_json_str(r#"{
//!         "db": {"url": "postgres://localhost/app"},
//!         "server": {"port": 8080, "db": {"$ref": "db"}}
//!     }"#)?;
//!
//!     // 3. Start it, run until Ctrl+C / SIGTERM, then tear it down
//!     let mut system = wireup.start(config, ["server"]).await?;
//!     system.run_until_signal().await
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod resolved;
pub mod system;

// Re-export core types
pub use config::{Config, Ref, Value, reference};
pub use error::{ErrorKind, HookPhase, Result, WireupError};
pub use hooks::{HookRegistry, OnCreate, OnDestroy};
pub use resolved::{Instance, Resolved};
pub use system::{System, SystemState, Wireup};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;

/// Prelude module for convenient imports
///
/// ```
/// use wireup::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Config, Ref, Value, reference};
    pub use crate::error::{ErrorKind, HookPhase, Result, WireupError};
    pub use crate::hooks::{HookRegistry, Hooks, OnCreate, OnDestroy};
    pub use crate::resolved::{Instance, Resolved};
    pub use crate::system::{System, SystemState, Wireup, shutdown_signal};
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
