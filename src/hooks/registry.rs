use super::{OnCreate, OnDestroy};
use crate::error::{HookPhase, Result, WireupError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// A name -> hook lookup table, as consumed by the resolution and teardown engines
pub type HookTable<H> = HashMap<String, Arc<H>>;

/// Thread-safe registry of lifecycle hooks.
///
/// Each config key can have at most one on-create and one on-destroy hook.
/// Systems never read the registry directly; they work from a
/// [`Hooks`] snapshot taken when they start.
#[derive(Default)]
pub struct HookRegistry {
    create: DashMap<String, Arc<dyn OnCreate>>,
    destroy: DashMap<String, Arc<dyn OnDestroy>>,
}

/// An immutable copy of both hook tables
#[derive(Clone, Default)]
pub struct Hooks {
    create: HookTable<dyn OnCreate>,
    destroy: HookTable<dyn OnDestroy>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            create: DashMap::new(),
            destroy: DashMap::new(),
        }
    }

    /// Register the on-create hook for `key`
    pub fn on_create<H>(&self, key: impl Into<String>, hook: H) -> Result<()>
    where
        H: OnCreate + 'static,
    {
        insert_unique(&self.create, key.into(), Arc::new(hook), HookPhase::Create)
    }

    /// Register the on-destroy hook for `key`
    pub fn on_destroy<H>(&self, key: impl Into<String>, hook: H) -> Result<()>
    where
        H: OnDestroy + 'static,
    {
        insert_unique(&self.destroy, key.into(), Arc::new(hook), HookPhase::Destroy)
    }

    /// Copy the current tables. Later registrations do not affect the copy.
    pub fn snapshot(&self) -> Hooks {
        Hooks {
            create: self
                .create
                .iter()
                .map(|e| (e.key().clone(), Arc::clone(e.value())))
                .collect(),
            destroy: self
                .destroy
                .iter()
                .map(|e| (e.key().clone(), Arc::clone(e.value())))
                .collect(),
        }
    }

    /// Remove every registered hook
    pub fn reset(&self) {
        self.create.clear();
        self.destroy.clear();
    }

    /// Check whether `key` has a hook for `phase`
    pub fn contains(&self, key: &str, phase: HookPhase) -> bool {
        match phase {
            HookPhase::Create => self.create.contains_key(key),
            HookPhase::Destroy => self.destroy.contains_key(key),
        }
    }

    /// Get the number of registered on-create hooks
    pub fn create_hook_count(&self) -> usize {
        self.create.len()
    }

    /// Get the number of registered on-destroy hooks
    pub fn destroy_hook_count(&self) -> usize {
        self.destroy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.destroy.is_empty()
    }
}

fn insert_unique<H: ?Sized>(
    table: &DashMap<String, Arc<H>>,
    key: String,
    hook: Arc<H>,
    phase: HookPhase,
) -> Result<()> {
    match table.entry(key) {
        Entry::Occupied(entry) => Err(WireupError::DuplicateHook {
            key: entry.key().clone(),
            phase,
        }),
        Entry::Vacant(entry) => {
            tracing::debug!("Registered {} hook: {}", phase, entry.key());
            entry.insert(hook);
            Ok(())
        }
    }
}

impl Hooks {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_hooks(&self) -> &HookTable<dyn OnCreate> {
        &self.create
    }

    pub fn destroy_hooks(&self) -> &HookTable<dyn OnDestroy> {
        &self.destroy
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut create: Vec<&str> = self.create.keys().map(String::as_str).collect();
        let mut destroy: Vec<&str> = self.destroy.keys().map(String::as_str).collect();
        create.sort_unstable();
        destroy.sort_unstable();
        f.debug_struct("Hooks")
            .field("create", &create)
            .field("destroy", &destroy)
            .finish()
    }
}
