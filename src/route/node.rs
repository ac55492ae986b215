//! Route nodes — detached definitions and live records.
//!
//! A route tree is declared with [`RouteNode`] values: handler leaves come from
//! the per-method builders on [`DynaRouter`](crate::router::DynaRouter), groups
//! from [`RouteNode::group`]. A detached node owns its children outright.
//!
//! Once attached to a [`RouteTree`](super::RouteTree) every node becomes a
//! [`Route`]: the same metadata plus the derived URL and identity, a
//! non-owning back-reference to its parent, and the ordered ids of the children
//! it owns.

use std::fmt;

use serde::Serialize;

use super::RouteId;
use super::path::clean;
use crate::http::Method;

/// Position of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The single `/` node every store starts with.
    Root,
    /// A path prefix shared by its children; serves nothing itself.
    Group,
    /// A leaf binding methods on a URL to a registered handler.
    Handler,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Root => "root",
            Self::Group => "group",
            Self::Handler => "handler",
        })
    }
}

/// A route definition that is not yet part of any tree.
///
/// # Examples
///
/// ```rust
/// use dynaroute::route::{NodeKind, RouteNode};
///
/// let admin = RouteNode::group("admin", "Admin", "Back-office endpoints", [])
///     .use_middleware(["auth"]);
///
/// assert_eq!(admin.kind(), NodeKind::Group);
/// assert_eq!(admin.prefix(), "/admin");
/// assert_eq!(admin.middlewares(), ["auth"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteNode {
    pub(crate) kind: NodeKind,
    pub(crate) prefix: String,
    pub(crate) param: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) methods: Vec<Method>,
    pub(crate) handler: Option<String>,
    pub(crate) middlewares: Vec<String>,
    pub(crate) enabled: bool,
    pub(crate) children: Vec<RouteNode>,
}

impl RouteNode {
    /// Build a detached group whose children are exactly `children`, in order.
    ///
    /// `prefix` is rooted and cleaned, so `"api"`, `"/api"` and `"/api/"` all
    /// produce `/api`.
    pub fn group(
        prefix: &str,
        name: impl Into<String>,
        description: impl Into<String>,
        children: impl IntoIterator<Item = RouteNode>,
    ) -> Self {
        Self {
            kind: NodeKind::Group,
            prefix: clean(&format!("/{prefix}")),
            param: String::new(),
            name: name.into(),
            description: description.into(),
            methods: Vec::new(),
            handler: None,
            middlewares: Vec::new(),
            enabled: true,
            children: children.into_iter().collect(),
        }
    }

    // Handler leaves are only built through the router so that their callable is
    // registered alongside.
    pub(crate) fn handler(
        methods: Vec<Method>,
        prefix: String,
        param: Option<&str>,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Into<String>,
    ) -> Self {
        let mut methods: Vec<Method> = methods.into_iter().map(Method::canonical).collect();
        methods.sort();
        methods.dedup();
        Self {
            kind: NodeKind::Handler,
            prefix,
            param: param.unwrap_or_default().to_owned(),
            name: name.into(),
            description: description.into(),
            methods,
            handler: Some(handler.into()),
            middlewares: Vec::new(),
            enabled: true,
            children: Vec::new(),
        }
    }

    /// Append a child to this node.
    pub fn child(mut self, node: RouteNode) -> Self {
        self.children.push(node);
        self
    }

    /// Append middleware names to this node's own chain.
    pub fn use_middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middlewares.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set `enabled` on this node and every descendant.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        for child in &mut self.children {
            child.set_enabled(enabled);
        }
    }

    /// Chaining form of [`set_enabled`](Self::set_enabled).
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.set_enabled(enabled);
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn handler_name(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    pub fn middlewares(&self) -> &[String] {
        &self.middlewares
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn children(&self) -> &[RouteNode] {
        &self.children
    }
}

/// A node that is live in a [`RouteTree`](super::RouteTree).
///
/// Values handed out by the tree are snapshots: mutating the tree afterwards
/// does not update a `Route` already returned. `parent_url` is the parent's URL
/// at the time this node was last resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub(crate) id: RouteId,
    pub(crate) kind: NodeKind,
    pub(crate) url: String,
    pub(crate) parent_url: String,
    pub(crate) prefix: String,
    pub(crate) param: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) methods: Vec<Method>,
    pub(crate) handler: Option<String>,
    pub(crate) middlewares: Vec<String>,
    pub(crate) enabled: bool,
    pub(crate) parent: Option<RouteId>,
    pub(crate) children: Vec<RouteId>,
}

impl Route {
    pub fn id(&self) -> &RouteId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The resolved absolute URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parent_url(&self) -> &str {
        &self.parent_url
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn handler_name(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    pub fn middlewares(&self) -> &[String] {
        &self.middlewares
    }

    /// This node's own flag. See [`RouteTree::is_active`](super::RouteTree::is_active)
    /// for the effective state including ancestors.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn parent(&self) -> Option<&RouteId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[RouteId] {
        &self.children
    }
}
