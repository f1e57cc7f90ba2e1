use super::{BoxFuture, Cache, Dep, Path, Target};
use crate::config::{Config, Value};
use crate::error::{HookPhase, Result, WireupError};
use crate::hooks::{HookTable, OnCreate};
use crate::resolved::Resolved;
use indexmap::IndexMap;

/// Resolve `target` against `config`.
///
/// For [`Target::Key`] the result is memoized in `cache`: a key that is
/// already cached is returned as is, otherwise its declared value is
/// resolved, passed through its on-create hook (if any) and stored.
/// [`Target::Value`] resolves a nested value without touching the cache.
///
/// `path` is the chain walked so far; pass [`Path::new()`] for an entry point.
///
/// # Errors
///
/// - [`WireupError::Cycle`] if a reference leads back onto `path`
/// - [`WireupError::MissingKey`] if a key or reference target is not in `config`
/// - [`WireupError::HookFailed`] if an on-create hook fails. Keys created
///   before the failure stay in `cache`.
pub fn resolve<'a>(
    config: &'a Config,
    hooks: &'a HookTable<dyn OnCreate>,
    cache: &'a mut Cache,
    path: Path,
    target: Target<'a>,
) -> BoxFuture<'a, Result<Resolved>> {
    Box::pin(async move {
        let (key, declared) = match target {
            Target::Key(key) => {
                if let Some(cached) = cache.get(key) {
                    tracing::trace!("Reusing started component: {}", key);
                    return Ok(cached.clone());
                }
                let declared = config
                    .get(key)
                    .ok_or_else(|| WireupError::missing_key(key))?;
                (Some(key), declared)
            }
            Target::Value(value) => (None, value),
        };

        let resolved = match declared {
            Value::Ref(reference) => {
                let dep = reference.key();
                let dep_path = path.append(Dep::Key(dep.to_string()))?;
                resolve(config, hooks, &mut *cache, dep_path, Target::Key(dep)).await?
            }
            Value::Map(fields) => {
                let parent = key.or_else(|| path.last()).unwrap_or_default();
                let mut resolved = IndexMap::with_capacity(fields.len());
                for (field, value) in fields.iter() {
                    let field_path = path.append(Dep::Field(format!("{parent}.{field}")))?;
                    tracing::trace!("Resolving field: {}", field_path);
                    let value =
                        resolve(config, hooks, &mut *cache, field_path, Target::Value(value))
                            .await?;
                    resolved.insert(field.to_string(), value);
                }
                Resolved::Map(resolved)
            }
            Value::Primitive(value) => Resolved::Primitive(value.clone()),
        };

        let Some(key) = key else {
            return Ok(resolved);
        };

        let created = match hooks.get(key) {
            Some(hook) => {
                tracing::debug!("Creating: {}", key);
                hook.on_create(resolved).await.map_err(|e| {
                    tracing::error!("on-create failed for {}: {}", key, e);
                    WireupError::hook_failed(key, HookPhase::Create, e)
                })?
            }
            None => resolved,
        };

        tracing::debug!("Created: {} = {}", key, created.describe());
        cache.insert(key.to_string(), created.clone());
        Ok(created)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::reference;
    use crate::engine::testing::{entries, log, record_create};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn no_hooks() -> HookTable<dyn OnCreate> {
        HookTable::new()
    }

    async fn start(
        config: &Config,
        hooks: &HookTable<dyn OnCreate>,
        cache: &mut Cache,
        key: &str,
    ) -> Result<Resolved> {
        resolve(config, hooks, cache, Path::new(), Target::Key(key)).await
    }

    fn cache_of(json: serde_json::Value) -> Cache {
        match Resolved::from_json(json) {
            Resolved::Map(map) => map,
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fills_cache_with_primitives() {
        let config = Config::new().with("main", "foo").with("test", "bar");
        let mut cache = Cache::new();

        start(&config, &no_hooks(), &mut cache, "main").await.unwrap();

        assert_eq!(cache, cache_of(json!({"main": "foo"})));
    }

    #[tokio::test]
    async fn test_fills_cache_with_nested_maps() {
        let config = Config::new()
            .with("main", Config::new().with("foo", 1).with("bar", 2))
            .with("test", 3);
        let mut cache = Cache::new();

        start(&config, &no_hooks(), &mut cache, "main").await.unwrap();

        assert_eq!(cache, cache_of(json!({"main": {"foo": 1, "bar": 2}})));
    }

    #[tokio::test]
    async fn test_fills_cache_with_resolved_references() {
        let config = Config::new()
            .with("main", Config::new().with("foo", 1).with("bar", reference("test")))
            .with("test", 2);
        let mut cache = Cache::new();

        let main = start(&config, &no_hooks(), &mut cache, "main").await.unwrap();

        assert_eq!(main, Resolved::from_json(json!({"foo": 1, "bar": 2})));
        assert_eq!(cache, cache_of(json!({"main": {"foo": 1, "bar": 2}, "test": 2})));
        // The dependency finished first
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["test", "main"]);
    }

    #[tokio::test]
    async fn test_uses_create_hooks_for_root_keys() {
        let config = Config::new().with("main", 1).with("test", 2);
        let mut hooks = no_hooks();
        hooks.insert(
            "main".into(),
            Arc::new(|v: Resolved| async move {
                anyhow::Ok(Resolved::from(v.as_i64().unwrap_or_default() + 4))
            }),
        );
        let mut cache = Cache::new();

        start(&config, &hooks, &mut cache, "main").await.unwrap();

        assert_eq!(cache, cache_of(json!({"main": 5})));
    }

    #[tokio::test]
    async fn test_nested_fields_are_not_hooked() {
        // A field that happens to share a hooked key's name is not that key
        let config = Config::new()
            .with("main", Config::new().with("db", "inline"))
            .with("db", "top-level");
        let log = log();
        let mut hooks = no_hooks();
        hooks.insert("db".into(), record_create(&log, "db"));
        hooks.insert("main".into(), record_create(&log, "main"));
        let mut cache = Cache::new();

        start(&config, &hooks, &mut cache, "main").await.unwrap();

        assert_eq!(entries(&log), vec!["create main"]);
        assert!(!cache.contains_key("db"));
    }

    #[tokio::test]
    async fn test_starts_dependencies_only_once() {
        let config = Config::new()
            .with("a", Config::new().with("c", reference("c")))
            .with("b", Config::new().with("c", reference("c")))
            .with("c", "test");

        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let mut hooks = no_hooks();
        hooks.insert(
            "c".into(),
            Arc::new(move |_: Resolved| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { anyhow::Ok(Resolved::instance(String::from("connection"))) }
            }),
        );
        let mut cache = Cache::new();

        let a = start(&config, &hooks, &mut cache, "a").await.unwrap();
        let b = start(&config, &hooks, &mut cache, "b").await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        // Same allocation, not just an equal value
        assert_eq!(a.get("c"), b.get("c"));
        assert!(a.get("c").and_then(|c| c.downcast::<String>()).is_some());
    }

    #[tokio::test]
    async fn test_cached_key_skips_config_and_hooks() {
        let config = Config::new().with("main", 1);
        let log = log();
        let mut hooks = no_hooks();
        hooks.insert("main".into(), record_create(&log, "main"));
        let mut cache = Cache::new();
        cache.insert("main".into(), Resolved::from("preloaded"));

        let main = start(&config, &hooks, &mut cache, "main").await.unwrap();

        assert_eq!(main, Resolved::from("preloaded"));
        assert!(entries(&log).is_empty());
    }

    #[tokio::test]
    async fn test_hooks_run_in_dependency_then_declared_order() {
        let config = Config::new()
            .with(
                "app",
                Config::new()
                    .with("cache", reference("cache"))
                    .with("db", reference("db")),
            )
            .with("db", Config::new().with("url", "postgres://localhost"))
            .with("cache", Config::new().with("db", reference("db")));
        let log = log();
        let mut hooks = no_hooks();
        for name in ["app", "db", "cache"] {
            hooks.insert(name.into(), record_create(&log, name));
        }
        let mut cache = Cache::new();

        start(&config, &hooks, &mut cache, "app").await.unwrap();

        assert_eq!(entries(&log), vec!["create db", "create cache", "create app"]);
    }

    #[tokio::test]
    async fn test_rejects_cycles_before_any_hook() {
        let config = Config::new()
            .with("a", reference("b"))
            .with("b", reference("a"));
        let log = log();
        let mut hooks = no_hooks();
        hooks.insert("a".into(), record_create(&log, "a"));
        hooks.insert("b".into(), record_create(&log, "b"));
        let mut cache = Cache::new();

        let err = start(&config, &hooks, &mut cache, "a").await.unwrap_err();

        assert!(matches!(err, WireupError::Cycle { ref chain } if chain == "b->a->b"));
        assert!(entries(&log).is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_cycles_through_nested_fields() {
        let config = Config::new()
            .with("a", Config::new().with("inner", Config::new().with("b", reference("b"))))
            .with("b", Config::new().with("a", reference("a")));
        let mut cache = Cache::new();

        let err = start(&config, &no_hooks(), &mut cache, "a").await.unwrap_err();

        assert!(
            matches!(err, WireupError::Cycle { ref chain } if chain == "a.inner->a.inner.b->b->b.a->a->a.inner"),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_self_reference_is_a_cycle() {
        let config = Config::new().with("a", reference("a"));
        let mut cache = Cache::new();

        let err = start(&config, &no_hooks(), &mut cache, "a").await.unwrap_err();

        assert!(matches!(err, WireupError::Cycle { ref chain } if chain == "a->a"));
    }

    #[tokio::test]
    async fn test_repeated_field_names_are_not_cycles() {
        let config = Config::new().with(
            "a",
            Config::new().with("foo", Config::new().with("foo", Config::new().with("foo", 1))),
        );
        let mut cache = Cache::new();

        let a = start(&config, &no_hooks(), &mut cache, "a").await.unwrap();

        assert_eq!(a, Resolved::from_json(json!({"foo": {"foo": {"foo": 1}}})));
    }

    #[tokio::test]
    async fn test_dotted_key_is_not_a_field_location() {
        let config = Config::new()
            .with("a", Config::new().with("x", reference("a.x")))
            .with("a.x", 1);
        let mut cache = Cache::new();

        let a = start(&config, &no_hooks(), &mut cache, "a").await.unwrap();

        assert_eq!(a, Resolved::from_json(json!({"x": 1})));
        assert_eq!(cache.get("a.x"), Some(&Resolved::from(1)));
    }

    #[tokio::test]
    async fn test_arrays_are_not_traversed() {
        let config = Config::new().with("main", vec![json!({"$ref": "other"}), json!(2)]);
        let mut cache = Cache::new();

        let main = start(&config, &no_hooks(), &mut cache, "main").await.unwrap();

        assert_eq!(main, Resolved::from(json!([{"$ref": "other"}, 2])));
    }

    #[tokio::test]
    async fn test_missing_reference_target() {
        let config = Config::new().with("main", Config::new().with("db", reference("db")));
        let mut cache = Cache::new();

        let err = start(&config, &no_hooks(), &mut cache, "main").await.unwrap_err();

        assert!(matches!(err, WireupError::MissingKey { ref key } if key == "db"));
    }

    #[tokio::test]
    async fn test_hook_failure_keeps_partial_cache() {
        let config = Config::new()
            .with("main", Config::new().with("a", reference("a")).with("b", reference("b")))
            .with("a", 1)
            .with("b", 2);
        let mut hooks = no_hooks();
        hooks.insert(
            "b".into(),
            Arc::new(|_: Resolved| async { Err::<Resolved, _>(anyhow::anyhow!("port in use")) }),
        );
        let mut cache = Cache::new();

        let err = start(&config, &hooks, &mut cache, "main").await.unwrap_err();

        assert!(matches!(
            err,
            WireupError::HookFailed { ref key, phase: HookPhase::Create, .. } if key == "b"
        ));
        assert_eq!(cache, cache_of(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_nested_value_target_is_not_cached() {
        let config = Config::new().with("dep", 7);
        let value = Value::from(Config::new().with("x", reference("dep")));
        let mut cache = Cache::new();

        let resolved = resolve(&config, &no_hooks(), &mut cache, Path::new(), Target::Value(&value))
            .await
            .unwrap();

        assert_eq!(resolved, Resolved::from_json(json!({"x": 7})));
        assert_eq!(cache, cache_of(json!({"dep": 7})));
    }
}
