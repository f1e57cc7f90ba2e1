use super::{BoxFuture, Cache, Target};
use crate::config::{Config, Value};
use crate::error::{HookPhase, Result, WireupError};
use crate::hooks::{HookTable, OnDestroy};

/// Tear down `target` and everything its declaration references.
///
/// [`Target::Key`] removes the key from `cache`, runs its on-destroy hook
/// with the removed value and then tears down the key's declared config.
/// A key that is not cached is skipped, so each hook runs at most once no
/// matter how many entry points share the key.
///
/// [`Target::Value`] follows references and walks nested maps in declared
/// order; primitives are ignored.
///
/// # Errors
///
/// [`WireupError::HookFailed`] if an on-destroy hook fails. The remaining
/// teardown is abandoned; the failed key is already out of the cache.
pub fn teardown<'a>(
    config: &'a Config,
    hooks: &'a HookTable<dyn OnDestroy>,
    cache: &'a mut Cache,
    target: Target<'a>,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let key = match target {
            Target::Key(key) => key,
            Target::Value(Value::Ref(reference)) => reference.key(),
            Target::Value(Value::Map(fields)) => {
                for (_, value) in fields.iter() {
                    teardown(config, hooks, &mut *cache, Target::Value(value)).await?;
                }
                return Ok(());
            }
            Target::Value(Value::Primitive(_)) => return Ok(()),
        };

        // Removed before the hook runs so a second path to this key is a no-op
        let Some(value) = cache.shift_remove(key) else {
            tracing::trace!("Already stopped: {}", key);
            return Ok(());
        };

        if let Some(hook) = hooks.get(key) {
            tracing::debug!("Destroying: {}", key);
            hook.on_destroy(value).await.map_err(|e| {
                tracing::error!("on-destroy failed for {}: {}", key, e);
                WireupError::hook_failed(key, HookPhase::Destroy, e)
            })?;
        }
        tracing::debug!("Destroyed: {}", key);

        match config.get(key) {
            Some(declared) => teardown(config, hooks, cache, Target::Value(declared)).await,
            None => Ok(()),
        }
    })
}
