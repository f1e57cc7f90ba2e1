//! Lifecycle hooks
//!
//! Hooks attach behavior to top-level config keys:
//!
//! ```text
//! start:  resolve dependencies -> on-create(resolved) -> cached value
//! stop:   remove cached value  -> on-destroy(cached)  -> stop declared dependencies
//! ```
//!
//! # Example
//!
//! ```rust
//! use wireup::hooks::HookRegistry;
//! use wireup::Resolved;
//!
//! let registry = HookRegistry::new();
//! registry
//!     .on_create("port", |v: Resolved| async move {
//!         let port = v.as_i64().unwrap_or(8080);
//!         Ok::<_, anyhow::Error>(Resolved::from(port + 1))
//!     })
//!     .unwrap();
//!
//! let again = registry.on_create("port", |v: Resolved| async move { Ok::<_, anyhow::Error>(v) });
//! assert!(again.is_err());
//! ```

mod registry;
mod traits;

pub use registry::{HookRegistry, HookTable, Hooks};
pub use traits::{OnCreate, OnDestroy};
