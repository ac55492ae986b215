//! Handler bindings — named callables referenced by route nodes.
//!
//! Route nodes never own the callable they dispatch to. A handler leaf stores
//! the handler's fully-qualified name, and the callable itself is registered
//! once in a [`HandlerRegistry`] under that name. Many routes may share one
//! handler.
//!
//! The qualified name is declared explicitly by the caller through
//! [`HandlerRef::new`] or the [`handler!`](crate::handler!) macro, which
//! captures `module_path!()` and the function identifier at compile time. The
//! handler's default URL segment is derived from the last component of that
//! name:
//!
//! | Qualified name                 | Route prefix      |
//! |--------------------------------|-------------------|
//! | `app::users::UserHandle`       | `/user`           |
//! | `app::users::get_profile_handle` | `/get_profile`  |
//! | `app::HTTPStatusHandle`        | `/http_status`    |

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// A handler callable together with its fully-qualified name.
#[derive(Clone)]
pub struct HandlerRef<H> {
    name: String,
    handler: H,
}

impl<H> HandlerRef<H> {
    /// Pair `handler` with its qualified `name` (e.g. `"app::users::list_handle"`).
    pub fn new(name: impl Into<String>, handler: H) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The URL segment a route built from this handler gets by default.
    pub fn route_prefix(&self) -> String {
        route_prefix(&self.name)
    }

    pub fn into_parts(self) -> (String, H) {
        (self.name, self.handler)
    }
}

impl<H> fmt::Debug for HandlerRef<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRef").field("name", &self.name).finish()
    }
}

/// Build a [`HandlerRef`] named after the calling module and the function.
///
/// The optional second argument wraps the function before it is stored, which
/// is how a plain `fn` becomes the registry's handler type:
///
/// ```rust
/// use std::sync::Arc;
/// use dynaroute::handler::HandlerRef;
///
/// type Handler = Arc<dyn Fn() -> &'static str + Send + Sync>;
///
/// fn user_handle() -> &'static str {
///     "user"
/// }
///
/// let wrap = |f: fn() -> &'static str| -> Handler { Arc::new(f) };
/// let reference: HandlerRef<Handler> = dynaroute::handler!(user_handle, wrap);
/// assert!(reference.name().ends_with("::user_handle"));
/// assert_eq!(reference.route_prefix(), "/user");
/// ```
#[macro_export]
macro_rules! handler {
    ($func:ident) => {
        $crate::handler::HandlerRef::new(
            concat!(module_path!(), "::", stringify!($func)),
            $func,
        )
    };
    ($func:ident, $wrap:expr) => {
        $crate::handler::HandlerRef::new(
            concat!(module_path!(), "::", stringify!($func)),
            ($wrap)($func),
        )
    };
}

/// Derive a route prefix from a handler's qualified name.
///
/// Takes the last `::` or `.` separated component, strips a trailing
/// `Handle` or `_handle`, converts the rest to snake case and roots it.
pub fn route_prefix(qualified: &str) -> String {
    let last = qualified
        .rsplit("::")
        .next()
        .and_then(|s| s.rsplit('.').next())
        .unwrap_or(qualified);

    let stem = last
        .strip_suffix("Handle")
        .or_else(|| last.strip_suffix("_handle"))
        .unwrap_or(last);

    format!("/{}", snake_case(stem))
}

/// Convert an identifier from camel/pascal case to lower snake case.
///
/// Acronyms stay together (`HTTPServer` → `http_server`) and existing
/// underscores are kept without doubling.
pub fn snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Name → callable map shared by every route that references a handler.
///
/// The first registration of a name wins; later registrations under the same
/// name are ignored so that routes built earlier keep dispatching to the same
/// callable.
pub struct HandlerRegistry<H> {
    handlers: HashMap<String, H>,
}

impl<H> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<H> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

impl<H> HandlerRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`. Returns `false` if the name was taken.
    pub fn register(&mut self, name: impl Into<String>, handler: H) -> bool {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            debug!(handler = %name, "handler already registered");
            return false;
        }
        debug!(handler = %name, "handler registered");
        self.handlers.insert(name, handler);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H: Clone> HandlerRegistry<H> {
    /// Returns a clone of the callable registered under `name`.
    pub fn get(&self, name: &str) -> Option<H> {
        self.handlers.get(name).cloned()
    }
}
