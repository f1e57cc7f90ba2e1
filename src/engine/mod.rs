//! Resolution and teardown engines
//!
//! [`resolve`] turns a config key into a live value:
//!
//! ```text
//! resolve(key)
//!   cached?          -> return cached value, no hooks
//!   Ref(target)      -> resolve(target)            (cycle-checked)
//!   Map(fields)      -> resolve each field in order (not cached, not hooked)
//!   primitive        -> as is
//!   then             -> on-create hook, cache[key] = result
//! ```
//!
//! [`teardown`] walks the *declared* config of a key, not its resolved
//! value, since an on-create hook may have replaced the value with
//! something that no longer carries references:
//!
//! ```text
//! teardown(key)
//!   not cached       -> nothing to do
//!   else             -> remove cache[key], on-destroy hook, teardown(config[key])
//! ```
//!
//! Both run strictly sequentially: siblings are processed one after another
//! in declared order so hook order follows the config's textual order.

mod path;
mod resolve;
mod teardown;

pub use path::{Dep, Path};
pub use resolve::resolve;
pub use teardown::teardown;

use crate::config::Value;
use crate::resolved::Resolved;
use indexmap::IndexMap;
use std::future::Future;
use std::pin::Pin;

/// Live values of the started top-level keys, in creation order
pub type Cache = IndexMap<String, Resolved>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a resolve or teardown call operates on
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A top-level config key. Memoized, hooked and cached.
    Key(&'a str),
    /// A value inside the config tree. Never hooked or cached itself.
    Value(&'a Value),
}
