//! Systems: started config trees
//!
//! A [`Wireup`] handle owns a hook registry. Each [`System`] it prepares
//! owns its config, entry points and cache, and copies the registry's hooks
//! when [`System::start`] begins. Hooks registered after that point are
//! never seen by the running system.
//!
//! # System lifecycle
//!
//! ```text
//! Ready --start--> Running --stop--> Stopped
//!   |                                  ^
//!   +--start fails--> Failed --stop----+
//! ```
//!
//! A failed start keeps whatever was created before the failure; calling
//! [`System::stop`] on the failed system destroys exactly those components.
//! [`Wireup::start`] drops a system that fails to start, so callers that
//! need that cleanup prepare with [`Wireup::system`] and start it themselves.
//!
//! # Example
//!
//! ```rust
//! use wireup::{Config, Resolved, Wireup, reference};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> wireup::Result<()> {
//! let wireup = Wireup::new();
//! wireup.on_create("port", |v: Resolved| async move {
//!     anyhow::Ok(Resolved::from(v.as_i64().unwrap_or_default() + 1))
//! })?;
//!
//! let config = Config::new()
//!     .with("server", Config::new().with("port", reference("port")))
//!     .with("port", 8079);
//!
//! let mut system = wireup.start(config, ["server"]).await?;
//! assert_eq!(system.get("port"), Some(&Resolved::from(8080)));
//!
//! system.stop().await?;
//! assert!(system.cache().is_empty());
//! # Ok(())
//! # }
//! ```

mod shutdown;

pub use shutdown::shutdown_signal;

use crate::config::Config;
use crate::engine::{Cache, Path, Target, resolve, teardown};
use crate::error::{Result, WireupError};
use crate::hooks::{HookRegistry, Hooks, OnCreate, OnDestroy};
use crate::resolved::Resolved;
use indexmap::IndexSet;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Entry point for registering hooks and starting systems
///
/// Handles are independent: hooks registered on one are never seen by another.
#[derive(Default)]
pub struct Wireup {
    hooks: Arc<HookRegistry>,
}

impl Wireup {
    /// Create a handle with no hooks registered
    pub fn new() -> Self {
        Self {
            hooks: Arc::new(HookRegistry::new()),
        }
    }

    /// Register the on-create hook for a config key
    pub fn on_create<H>(&self, key: impl Into<String>, hook: H) -> Result<()>
    where
        H: OnCreate + 'static,
    {
        self.hooks.on_create(key, hook)
    }

    /// Register the on-destroy hook for a config key
    pub fn on_destroy<H>(&self, key: impl Into<String>, hook: H) -> Result<()>
    where
        H: OnDestroy + 'static,
    {
        self.hooks.on_destroy(key, hook)
    }

    /// Get the hook registry shared by every system this handle prepares
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Prepare a system without starting it
    ///
    /// Hooks registered before [`System::start`] is called are used by the
    /// system.
    pub fn system<I, K>(&self, config: Config, entry_points: I) -> Result<System>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        System::new(config, entry_points, Arc::clone(&self.hooks))
    }

    /// Prepare and start a system.
    ///
    /// # Errors
    ///
    /// If starting fails the partially started system is dropped without
    /// running any on-destroy hooks, and components created before the
    /// failure are never destroyed. To clean them up, prepare with
    /// [`Wireup::system`], call [`System::start`], and on error call
    /// [`System::stop`] on the failed system:
    ///
    /// ```rust
    /// # use wireup::{Config, Wireup, reference};
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> wireup::Result<()> {
    /// # let wireup = Wireup::new();
    /// # let config = Config::new().with("server", reference("db")).with("db", 1);
    /// let mut system = wireup.system(config, ["server"])?;
    /// if let Err(e) = system.start().await {
    ///     system.stop().await?;
    ///     return Err(e);
    /// }
    /// # system.stop().await
    /// # }
    /// ```
    pub async fn start<I, K>(&self, config: Config, entry_points: I) -> Result<System>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut system = self.system(config, entry_points)?;
        system.start().await?;
        Ok(system)
    }

    /// Tear down a started system, see [`System::stop`]
    pub async fn stop(&self, system: &mut System) -> Result<()> {
        system.stop().await
    }
}

/// Where a [`System`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    /// Prepared, nothing created yet
    Ready,
    /// Every entry point resolved
    Running,
    /// A start or stop pass aborted; the cache holds what is still alive
    Failed,
    /// Torn down; the system cannot be used again
    Stopped,
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SystemState::Ready => "ready",
            SystemState::Running => "running",
            SystemState::Failed => "failed",
            SystemState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// A config tree together with the live components started from it
pub struct System {
    config: Config,
    entry_points: IndexSet<String>,
    registry: Arc<HookRegistry>,
    hooks: Hooks,
    cache: Cache,
    state: SystemState,
}

impl System {
    /// Create a system in the [`SystemState::Ready`] state.
    ///
    /// Duplicate entry points are kept once, at their first position.
    /// Hooks are read from `registry` when the system starts.
    pub fn new<I, K>(config: Config, entry_points: I, registry: Arc<HookRegistry>) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let entry_points: IndexSet<String> = entry_points.into_iter().map(Into::into).collect();
        if entry_points.is_empty() {
            return Err(WireupError::NoEntryPoints);
        }
        Ok(Self {
            config,
            entry_points,
            registry,
            hooks: Hooks::new(),
            cache: Cache::new(),
            state: SystemState::Ready,
        })
    }

    /// Resolve every entry point in order.
    ///
    /// The registry's hooks are copied first; the copy is used for this
    /// start and the matching [`System::stop`]. Stops at the first error and
    /// leaves the system [`SystemState::Failed`].
    pub async fn start(&mut self) -> Result<()> {
        if self.state != SystemState::Ready {
            return Err(WireupError::invalid_state("start", self.state));
        }

        self.hooks = self.registry.snapshot();

        tracing::info!(
            "Starting system ({} entry points)...",
            self.entry_points.len()
        );

        for key in &self.entry_points {
            let result = resolve(
                &self.config,
                self.hooks.create_hooks(),
                &mut self.cache,
                Path::new(),
                Target::Key(key),
            )
            .await;

            if let Err(e) = result {
                tracing::error!("Failed to start {}: {}", key, e);
                self.state = SystemState::Failed;
                return Err(e);
            }
        }

        self.state = SystemState::Running;
        tracing::info!("System started ({} components)", self.cache.len());
        Ok(())
    }

    /// Tear down every entry point in order.
    ///
    /// Anything still cached afterwards (left over from a failed start) is
    /// destroyed newest first. If a hook fails the system is left
    /// [`SystemState::Failed`] and `stop` can be called again to finish.
    pub async fn stop(&mut self) -> Result<()> {
        if !matches!(self.state, SystemState::Running | SystemState::Failed) {
            return Err(WireupError::invalid_state("stop", self.state));
        }

        tracing::info!("Stopping system ({} components)...", self.cache.len());

        if let Err(e) = self.teardown_all().await {
            tracing::error!("Failed to stop system: {}", e);
            self.state = SystemState::Failed;
            return Err(e);
        }

        self.state = SystemState::Stopped;
        tracing::info!("System stopped");
        Ok(())
    }

    async fn teardown_all(&mut self) -> Result<()> {
        let destroy = self.hooks.destroy_hooks();

        for key in &self.entry_points {
            // An entry point that failed to start is not cached, but its
            // dependencies may be
            let target = match (self.cache.contains_key(key), self.config.get(key)) {
                (true, _) => Target::Key(key),
                (false, Some(declared)) => Target::Value(declared),
                (false, None) => continue,
            };
            teardown(&self.config, destroy, &mut self.cache, target).await?;
        }

        while let Some(key) = self.cache.keys().next_back().cloned() {
            tracing::warn!("Destroying orphaned component: {}", key);
            teardown(&self.config, destroy, &mut self.cache, Target::Key(&key)).await?;
        }

        Ok(())
    }

    /// The live value of a started key
    pub fn get(&self, key: &str) -> Option<&Resolved> {
        self.cache.get(key)
    }

    /// The live service behind a started key, if it has type `T`
    pub fn get_instance<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get(key).and_then(Resolved::downcast::<T>)
    }

    /// Get the live values of every started key, in creation order
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Get the declared config this system was prepared with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Iterate over the entry points in start order
    pub fn entry_points(&self) -> impl Iterator<Item = &str> {
        self.entry_points.iter().map(String::as_str)
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> SystemState {
        self.state
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("entry_points", &self.entry_points)
            .field("state", &self.state)
            .field("started", &self.cache.keys().collect::<Vec<_>>())
            .field("hooks", &self.hooks)
            .finish()
    }
}
