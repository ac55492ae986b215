//! Dynamic router — declare a route tree at start-up and administer it at runtime.
//!
//! [`DynaRouter`] is the composition root the rest of the framework talks to.
//! It owns three pieces of shared state, each behind its own lock:
//!
//! - the live [`RouteTree`] (single writer, many readers),
//! - the [`HandlerRegistry`] holding the callables routes refer to by name,
//! - the global [`MiddlewareChain`].
//!
//! Every tree mutation holds the write lock for its whole duration, and every
//! read ([`tree`](DynaRouter::tree), [`flatten`](DynaRouter::flatten),
//! [`lookup`](DynaRouter::lookup)) holds the read lock while it copies nodes
//! out, so readers never observe a half-attached subtree.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use dynaroute::handler::HandlerRef;
//! use dynaroute::route::RouteNode;
//! use dynaroute::router::DynaRouter;
//!
//! type Handler = Arc<dyn Fn(&str) -> String + Send + Sync>;
//!
//! let router: DynaRouter<Handler> = DynaRouter::new();
//! let show: Handler = Arc::new(|id: &str| format!("user {id}"));
//!
//! router
//!     .root([RouteNode::group("/api", "API", "Public API", [
//!         router.get("Show user", "Fetch one user", HandlerRef::new("app::UserHandle", show), Some("/:id")),
//!     ])])
//!     .unwrap();
//!
//! let urls: Vec<String> = router.tree().iter().map(|r| r.url().to_owned()).collect();
//! assert_eq!(urls, ["/", "/api", "/api/user/:id"]);
//! ```

use parking_lot::RwLock;
use tracing::{error, info};

use crate::config::RouterConfig;
use crate::handler::{HandlerRef, HandlerRegistry};
use crate::http::Method;
use crate::middleware::MiddlewareChain;
use crate::route::{NodeKind, Route, RouteError, RouteId, RouteNode, RouteResult, RouteTree};

/// Route tree, handler registry and global middleware for one application.
///
/// Share it across threads with an [`Arc`](std::sync::Arc); every method takes
/// `&self`.
pub struct DynaRouter<H> {
    tree: RwLock<RouteTree>,
    handlers: RwLock<HandlerRegistry<H>>,
    middleware: RwLock<MiddlewareChain>,
}

impl<H> Default for DynaRouter<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> DynaRouter<H> {
    /// Create a router holding only the root `/`, no handlers and empty
    /// global middleware lists.
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(RouteTree::new()),
            handlers: RwLock::new(HandlerRegistry::new()),
            middleware: RwLock::new(MiddlewareChain::default()),
        }
    }

    /// Create a router whose global middleware lists come from `config`.
    pub fn with_config(config: &RouterConfig) -> Self {
        let router = Self::new();
        *router.middleware.write() = config.middleware_chain();
        router
    }

    // ── builders ──────────────────────────────────────────────────────────────

    /// Build a detached `GET` handler node.
    ///
    /// # Arguments
    ///
    /// - `name` — Human-readable route name.
    /// - `description` — Free-form description.
    /// - `handler` — The callable and its qualified name; the route prefix is
    ///   derived from the name and the callable is registered under it.
    /// - `param` — Optional trailing parameter template, e.g. `"/:id"`.
    pub fn get(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        self.build(vec![Method::Get], name, description, handler, param)
    }

    /// Build a detached `HEAD` handler node. See [`get`](Self::get).
    pub fn head(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        self.build(vec![Method::Head], name, description, handler, param)
    }

    /// Build a detached `OPTIONS` handler node. See [`get`](Self::get).
    pub fn options(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        self.build(vec![Method::Options], name, description, handler, param)
    }

    /// Build a detached `PATCH` handler node. See [`get`](Self::get).
    pub fn patch(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        self.build(vec![Method::Patch], name, description, handler, param)
    }

    /// Build a detached `POST` handler node. See [`get`](Self::get).
    pub fn post(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        self.build(vec![Method::Post], name, description, handler, param)
    }

    /// Build a detached `PUT` handler node. See [`get`](Self::get).
    pub fn put(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        self.build(vec![Method::Put], name, description, handler, param)
    }

    /// Build a detached `DELETE` handler node. See [`get`](Self::get).
    pub fn delete(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        self.build(vec![Method::Delete], name, description, handler, param)
    }

    /// Build a detached `TRACE` handler node. See [`get`](Self::get).
    pub fn trace(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        self.build(vec![Method::Trace], name, description, handler, param)
    }

    /// Build a detached handler node answering every standard method.
    pub fn any(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        self.build(Method::STANDARD.to_vec(), name, description, handler, param)
    }

    /// Build a detached handler node for an explicit method list.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::EmptyMethodSet`] when `methods` is empty; nothing
    /// is registered in that case.
    pub fn match_methods(
        &self,
        methods: &[Method],
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteResult<RouteNode> {
        let name = name.into();
        if methods.is_empty() {
            error!(route = %name, handler = %handler.name(), "route declares no HTTP methods");
            return Err(RouteError::EmptyMethodSet { name });
        }
        Ok(self.build(methods.to_vec(), name, description, handler, param))
    }

    fn build(
        &self,
        methods: Vec<Method>,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerRef<H>,
        param: Option<&str>,
    ) -> RouteNode {
        let prefix = handler.route_prefix();
        let (qualified, callable) = handler.into_parts();
        self.handlers.write().register(qualified.clone(), callable);
        RouteNode::handler(methods, prefix, param, name, description, qualified)
    }

    // ── assembly ──────────────────────────────────────────────────────────────

    /// Attach `nodes` under the root, in order, all or nothing.
    pub fn root(&self, nodes: impl IntoIterator<Item = RouteNode>) -> RouteResult<Vec<RouteId>> {
        self.tree.write().attach_root(nodes)
    }

    /// Attach `node` under `parent`. See [`RouteTree::attach`].
    pub fn attach(&self, parent: &RouteId, node: RouteNode) -> RouteResult<RouteId> {
        self.tree.write().attach(parent, node)
    }

    /// Remove `id` and its subtree. See [`RouteTree::detach`].
    pub fn detach(&self, id: &RouteId) -> RouteResult<Route> {
        self.tree.write().detach(id)
    }

    /// Run several tree mutations as one unit.
    ///
    /// `edit` works on a copy of the tree; the copy replaces the live tree
    /// only if `edit` succeeds. Readers are blocked for the duration.
    pub fn transaction<R>(
        &self,
        edit: impl FnOnce(&mut RouteTree) -> RouteResult<R>,
    ) -> RouteResult<R> {
        let mut tree = self.tree.write();
        let mut staged = tree.clone();
        let out = edit(&mut staged)?;
        *tree = staged;
        Ok(out)
    }

    // ── inspection ────────────────────────────────────────────────────────────

    pub fn root_id(&self) -> RouteId {
        self.tree.read().root_id().clone()
    }

    /// Snapshot of the node with identity `id`.
    pub fn lookup(&self, id: &RouteId) -> Option<Route> {
        self.tree.read().get(id).cloned()
    }

    /// Snapshot of every node, in pre-order from the root.
    pub fn tree(&self) -> Vec<Route> {
        self.tree.read().tree().into_iter().cloned().collect()
    }

    /// Snapshot of the subtree at `id`, in pre-order.
    pub fn flatten(&self, id: &RouteId) -> RouteResult<Vec<Route>> {
        Ok(self.tree.read().flatten(id)?.into_iter().cloned().collect())
    }

    /// Export the subtree at `id` as a detached definition.
    pub fn definition(&self, id: &RouteId) -> RouteResult<RouteNode> {
        self.tree.read().definition(id)
    }

    /// Run `read` against the tree under a single read lock.
    ///
    /// `read` must not call back into this router: the lock is not reentrant
    /// and is writer-fair, so a mutating call deadlocks immediately and a nested
    /// read deadlocks once a writer is queued. Use the `&RouteTree` it is given.
    pub fn with_tree<R>(&self, read: impl FnOnce(&RouteTree) -> R) -> R {
        read(&self.tree.read())
    }

    pub fn is_active(&self, id: &RouteId) -> bool {
        self.tree.read().is_active(id)
    }

    // ── administration ────────────────────────────────────────────────────────

    /// Enable or disable `id` and everything below it.
    pub fn set_enabled(&self, id: &RouteId, enabled: bool) -> RouteResult<usize> {
        self.tree.write().set_enabled(id, enabled)
    }

    pub fn set_name(&self, id: &RouteId, name: impl Into<String>) -> RouteResult<()> {
        self.tree.write().set_name(id, name)
    }

    pub fn set_description(&self, id: &RouteId, description: impl Into<String>) -> RouteResult<()> {
        self.tree.write().set_description(id, description)
    }

    pub fn set_middlewares(&self, id: &RouteId, middlewares: Vec<String>) -> RouteResult<()> {
        self.tree.write().set_middlewares(id, middlewares)
    }

    pub fn use_middleware<I, S>(&self, id: &RouteId, names: I) -> RouteResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tree.write().use_middleware(id, names)
    }

    /// Change the own prefix of `id`. Returns its new identity.
    pub fn set_prefix(&self, id: &RouteId, prefix: &str) -> RouteResult<RouteId> {
        self.tree.write().set_prefix(id, prefix)
    }

    /// Re-parent `id` under `parent`. Returns its new identity.
    pub fn move_to(&self, id: &RouteId, parent: &RouteId) -> RouteResult<RouteId> {
        self.tree.write().move_to(id, parent)
    }

    // ── middleware ────────────────────────────────────────────────────────────

    /// Replace the global list run before every route's own middlewares.
    pub fn set_before(&self, middlewares: Vec<String>) {
        info!(count = middlewares.len(), "global before-middleware set");
        self.middleware.write().set_before(middlewares);
    }

    /// Replace the global list run after every route's own middlewares.
    pub fn set_after(&self, middlewares: Vec<String>) {
        info!(count = middlewares.len(), "global after-middleware set");
        self.middleware.write().set_after(middlewares);
    }

    pub fn middleware(&self) -> MiddlewareChain {
        self.middleware.read().clone()
    }

    /// Declaration-order middleware chain for `id`: global `before`, the
    /// route's own list, global `after`.
    pub fn middleware_chain(&self, id: &RouteId) -> RouteResult<Vec<String>> {
        let tree = self.tree.read();
        let route = tree.get(id).ok_or_else(|| RouteError::NotFound(id.clone()))?;
        Ok(self.middleware.read().chain_for(route))
    }
}

impl<H: Clone> DynaRouter<H> {
    /// The callable registered under the qualified `name`.
    pub fn handler(&self, name: &str) -> Option<H> {
        self.handlers.read().get(name)
    }

    /// Every active handler route in tree order, paired with its callable.
    ///
    /// This is the table a dispatch engine builds its matcher from. Disabled
    /// routes, routes under a disabled group, and routes whose handler name is
    /// not registered are left out.
    pub fn active_handlers(&self) -> Vec<(Route, H)> {
        let tree = self.tree.read();
        let handlers = self.handlers.read();

        tree.tree()
            .into_iter()
            .filter(|route| route.kind() == NodeKind::Handler && tree.is_active(route.id()))
            .filter_map(|route| {
                let handler = handlers.get(route.handler_name()?)?;
                Some((route.clone(), handler))
            })
            .collect()
    }
}
