//! Middleware declarations — the ordered names wrapped around every route.
//!
//! Middleware is referenced by name only. Each route carries its own ordered
//! list; in addition, two process-wide lists run before and after every
//! route's own chain. Nothing here executes middleware: the dispatch engine
//! looks the names up and runs them in the order [`MiddlewareChain::chain_for`]
//! reports.
//!
//! ```text
//! before[0] → before[1] → … → route[0] → … → after[0] → after[1] → …
//! ```

use serde::Serialize;

use crate::route::Route;

/// The global `before` and `after` middleware lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MiddlewareChain {
    before: Vec<String>,
    after: Vec<String>,
}

impl MiddlewareChain {
    pub fn new(before: Vec<String>, after: Vec<String>) -> Self {
        Self { before, after }
    }

    /// Replace the list applied before every route's own chain.
    pub fn set_before(&mut self, middlewares: Vec<String>) {
        self.before = middlewares;
    }

    /// Replace the list applied after every route's own chain.
    pub fn set_after(&mut self, middlewares: Vec<String>) {
        self.after = middlewares;
    }

    pub fn before(&self) -> &[String] {
        &self.before
    }

    pub fn after(&self) -> &[String] {
        &self.after
    }

    /// Full declaration-order chain for `route`: `before`, the route's own
    /// middlewares, then `after`.
    pub fn chain_for(&self, route: &Route) -> Vec<String> {
        self.before
            .iter()
            .chain(route.middlewares())
            .chain(&self.after)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{RouteNode, RouteTree};

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn chain_wraps_route_middlewares() {
        let mut tree = RouteTree::new();
        let root = tree.root_id().clone();
        let id = tree
            .attach(&root, RouteNode::group("/g", "", "", []).use_middleware(["auth", "audit"]))
            .unwrap();

        let chain = MiddlewareChain::new(strings(&["trace"]), strings(&["metrics"]));
        let route = tree.get(&id).unwrap();
        assert_eq!(chain.chain_for(route), ["trace", "auth", "audit", "metrics"]);
    }

    #[test]
    fn setters_replace_lists() {
        let mut chain = MiddlewareChain::default();
        chain.set_before(strings(&["a"]));
        chain.set_before(strings(&["b", "c"]));
        chain.set_after(strings(&["z"]));
        assert_eq!(chain.before(), ["b", "c"]);
        assert_eq!(chain.after(), ["z"]);
    }

    #[test]
    fn empty_chain_is_route_only() {
        let tree = RouteTree::new();
        let root = tree.get(tree.root_id()).unwrap();
        assert!(MiddlewareChain::default().chain_for(root).is_empty());
    }
}
