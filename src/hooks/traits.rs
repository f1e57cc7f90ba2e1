//! Lifecycle hook traits
//!
//! Hooks are registered by config key. Any `Fn(Resolved) -> impl Future`
//! closure is a hook, and services can implement the traits directly.

use crate::resolved::Resolved;
use async_trait::async_trait;
use std::future::Future;

/// Called once when a top-level key has been resolved
///
/// The returned value replaces the resolved config value in the cache, so
/// this is where configuration becomes a live service.
///
/// # Example
///
/// ```rust,ignore
/// use wireup::hooks::OnCreate;
/// use wireup::{Resolved, async_trait};
///
/// struct ConnectDatabase;
///
/// #[async_trait]
/// impl OnCreate for ConnectDatabase {
///     async fn on_create(&self, config: Resolved) -> anyhow::Result<Resolved> {
///         let url = config.get("url").and_then(Resolved::as_str).unwrap_or_default();
///         Ok(Resolved::instance(Database::connect(url).await?))
///     }
/// }
/// ```
#[async_trait]
pub trait OnCreate: Send + Sync {
    async fn on_create(&self, value: Resolved) -> anyhow::Result<Resolved>;
}

/// Called once when a top-level key is torn down
///
/// Receives the value that was cached for the key, i.e. whatever the
/// on-create hook returned.
///
/// # Example
///
/// ```rust,ignore
/// use wireup::hooks::OnDestroy;
/// use wireup::{Resolved, async_trait};
///
/// struct CloseDatabase;
///
/// #[async_trait]
/// impl OnDestroy for CloseDatabase {
///     async fn on_destroy(&self, db: Resolved) -> anyhow::Result<()> {
///         if let Some(db) = db.downcast::<Database>() {
///             db.close().await?;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait OnDestroy: Send + Sync {
    async fn on_destroy(&self, value: Resolved) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> OnCreate for F
where
    F: Fn(Resolved) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Resolved>> + Send + 'static,
{
    async fn on_create(&self, value: Resolved) -> anyhow::Result<Resolved> {
        (self)(value).await
    }
}

#[async_trait]
impl<F, Fut> OnDestroy for F
where
    F: Fn(Resolved) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_destroy(&self, value: Resolved) -> anyhow::Result<()> {
        (self)(value).await
    }
}
