//! The live route tree and its identity index.
//!
//! [`RouteTree`] owns every attached [`Route`] in a single `id → route` map. The
//! tree shape lives in the records themselves: each parent lists its children's
//! ids in attachment order, and each child points back at its parent's id. Every
//! mutation keeps the map equal to the set of nodes reachable from the root.
//!
//! Mutations are planned before they are applied. A subtree is first resolved
//! (URLs and ids) into a flat, pre-order list, checked against the index, and
//! only then written, so a failed call leaves the tree exactly as it was.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::node::{NodeKind, Route, RouteNode};
use super::path::{self, clean};
use super::{RouteError, RouteId, RouteResult};

/// Prefix of the root node.
pub const ROOT_PREFIX: &str = "/";

// A resolved subtree ready to be indexed. `routes[0]` is the subtree root.
struct Plan {
    id: RouteId,
    routes: Vec<Route>,
}

// Where a planned subtree lands in its parent's children.
enum Slot {
    Replace(usize),
    Append,
}

/// Tree of route definitions plus the index from identity to node.
///
/// # Examples
///
/// ```rust
/// use dynaroute::route::{RouteNode, RouteTree};
///
/// let mut tree = RouteTree::new();
/// let root = tree.root_id().clone();
/// let api = tree.attach(&root, RouteNode::group("/api", "API", "", [])).unwrap();
///
/// assert_eq!(tree.get(&api).unwrap().url(), "/api");
/// assert_eq!(tree.tree().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RouteTree {
    root: RouteId,
    routes: HashMap<RouteId, Route>,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    /// Create a tree holding only the enabled root `/`.
    pub fn new() -> Self {
        let url = path::resolve(None, ROOT_PREFIX, "");
        let id = RouteId::derive(&url, &[]);
        let root = Route {
            id: id.clone(),
            kind: NodeKind::Root,
            url,
            parent_url: String::new(),
            prefix: ROOT_PREFIX.to_owned(),
            param: String::new(),
            name: String::new(),
            description: String::new(),
            methods: Vec::new(),
            handler: None,
            middlewares: Vec::new(),
            enabled: true,
            parent: None,
            children: Vec::new(),
        };

        let mut routes = HashMap::new();
        routes.insert(id.clone(), root);
        Self { root: id, routes }
    }

    pub fn root_id(&self) -> &RouteId {
        &self.root
    }

    /// Number of indexed nodes, root included.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` when nothing but the root is attached.
    pub fn is_empty(&self) -> bool {
        self.routes.len() == 1
    }

    /// Constant-time lookup by identity.
    pub fn get(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn contains(&self, id: &RouteId) -> bool {
        self.routes.contains_key(id)
    }

    /// Pre-order traversal of the subtree rooted at `id`: the node itself, then
    /// each child's traversal in child order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotFound`] if `id` is not in the tree.
    pub fn flatten(&self, id: &RouteId) -> RouteResult<Vec<&Route>> {
        let start = self.lookup(id)?;
        let mut out = Vec::new();
        let mut stack = vec![start];

        while let Some(route) = stack.pop() {
            out.push(route);
            stack.extend(route.children.iter().rev().filter_map(|c| self.routes.get(c)));
        }

        Ok(out)
    }

    /// The whole tree in pre-order, starting at the root.
    pub fn tree(&self) -> Vec<&Route> {
        self.flatten(&self.root).unwrap_or_default()
    }

    /// Recompute `id`'s URL from the prefixes and params of its ancestor chain.
    ///
    /// This ignores the cached URLs and returns the same value the last
    /// attach stored, as long as the tree is consistent.
    pub fn resolve_url(&self, id: &RouteId) -> Option<String> {
        let route = self.routes.get(id)?;
        match &route.parent {
            None => Some(path::resolve(None, &route.prefix, &route.param)),
            Some(parent) => {
                let parent_url = self.resolve_url(parent)?;
                Some(path::resolve(Some(&parent_url), &route.prefix, &route.param))
            }
        }
    }

    /// Returns `true` when `id` and every one of its ancestors are enabled.
    pub fn is_active(&self, id: &RouteId) -> bool {
        let mut cursor = self.routes.get(id);
        while let Some(route) = cursor {
            if !route.enabled {
                return false;
            }
            cursor = route.parent.as_ref().and_then(|p| self.routes.get(p));
        }
        self.routes.contains_key(id)
    }

    /// Attach `node` and its whole subtree under `parent`.
    ///
    /// URLs and identities are resolved for every node. If `parent` already
    /// has a child with the resulting identity, that child (and its subtree) is
    /// replaced in place; otherwise the node is appended after the existing
    /// children. The same replace rule applies among `node`'s own children.
    ///
    /// # Errors
    ///
    /// - [`RouteError::UnknownParent`] if `parent` is not in the tree.
    /// - [`RouteError::IdentityConflict`] if a resolved identity is already
    ///   indexed somewhere other than the replaced sibling, or appears twice in
    ///   the attached subtree.
    ///
    /// The tree is unchanged when an error is returned.
    pub fn attach(&mut self, parent: &RouteId, node: RouteNode) -> RouteResult<RouteId> {
        let parent_route = self
            .routes
            .get(parent)
            .ok_or_else(|| RouteError::UnknownParent(parent.clone()))?;

        let plan = plan_subtree(node, parent_route);
        let slot = match parent_route.children.iter().position(|c| *c == plan.id) {
            Some(index) => Slot::Replace(index),
            None => Slot::Append,
        };
        let evicted: HashSet<RouteId> = match slot {
            Slot::Replace(_) => self.subtree_ids(&plan.id).into_iter().collect(),
            Slot::Append => HashSet::new(),
        };

        self.check_conflicts(&plan, &evicted)?;

        let id = plan.id.clone();
        let replaced = matches!(slot, Slot::Replace(_));
        let count = plan.routes.len();
        self.apply(parent, plan, &evicted, slot);

        info!(
            id = %id.short(),
            parent = %parent.short(),
            nodes = count,
            replaced,
            "route attached"
        );
        Ok(id)
    }

    /// Attach each of `nodes` under the root, in order.
    ///
    /// Either every node is attached or, on the first error, none is.
    pub fn attach_root(&mut self, nodes: impl IntoIterator<Item = RouteNode>) -> RouteResult<Vec<RouteId>> {
        let root = self.root.clone();
        let mut staged = self.clone();
        let ids = nodes
            .into_iter()
            .map(|node| staged.attach(&root, node))
            .collect::<RouteResult<Vec<_>>>()?;
        *self = staged;
        Ok(ids)
    }

    /// Remove `id` from its parent and drop it and all of its descendants from
    /// the index. Returns the removed node as it was.
    ///
    /// # Errors
    ///
    /// [`RouteError::NotFound`] for an unknown id, [`RouteError::RootImmutable`]
    /// for the root.
    pub fn detach(&mut self, id: &RouteId) -> RouteResult<Route> {
        let parent = self.parent_of(id)?;

        let removed = self.subtree_ids(id);
        if let Some(parent) = self.routes.get_mut(&parent) {
            parent.children.retain(|c| c != id);
        }

        let mut detached = None;
        for child in &removed {
            let route = self.routes.remove(child);
            if child == id {
                detached = route;
            }
        }

        info!(id = %id.short(), nodes = removed.len(), "route detached");
        detached.ok_or_else(|| RouteError::NotFound(id.clone()))
    }

    /// Overwrite `enabled` on `id` and every descendant. Returns the number of
    /// nodes touched.
    pub fn set_enabled(&mut self, id: &RouteId, enabled: bool) -> RouteResult<usize> {
        self.lookup(id)?;
        let ids = self.subtree_ids(id);
        for child in &ids {
            if let Some(route) = self.routes.get_mut(child) {
                route.enabled = enabled;
            }
        }

        info!(id = %id.short(), enabled, nodes = ids.len(), "route enablement changed");
        Ok(ids.len())
    }

    pub fn set_name(&mut self, id: &RouteId, name: impl Into<String>) -> RouteResult<()> {
        self.lookup_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_description(&mut self, id: &RouteId, description: impl Into<String>) -> RouteResult<()> {
        self.lookup_mut(id)?.description = description.into();
        Ok(())
    }

    /// Replace this node's own middleware list.
    pub fn set_middlewares(&mut self, id: &RouteId, middlewares: Vec<String>) -> RouteResult<()> {
        self.lookup_mut(id)?.middlewares = middlewares;
        Ok(())
    }

    /// Append to this node's own middleware list.
    pub fn use_middleware<I, S>(&mut self, id: &RouteId, names: I) -> RouteResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lookup_mut(id)?
            .middlewares
            .extend(names.into_iter().map(Into::into));
        Ok(())
    }

    /// Change the own prefix of `id`, keeping its position under its parent.
    ///
    /// The node and its subtree are re-resolved, so their identities change
    /// with their URLs. Returns the node's new id.
    ///
    /// # Errors
    ///
    /// [`RouteError::NotFound`], [`RouteError::RootImmutable`], or
    /// [`RouteError::IdentityConflict`] when the new URL collides with a node
    /// outside the re-prefixed subtree.
    pub fn set_prefix(&mut self, id: &RouteId, prefix: &str) -> RouteResult<RouteId> {
        let parent = self.parent_of(id)?;
        let index = self
            .routes
            .get(&parent)
            .and_then(|p| p.children.iter().position(|c| c == id))
            .ok_or_else(|| RouteError::NotFound(id.clone()))?;

        let mut definition = self.definition(id)?;
        definition.prefix = clean(&format!("/{prefix}"));

        let plan = match self.routes.get(&parent) {
            Some(parent_route) => plan_subtree(definition, parent_route),
            None => return Err(RouteError::UnknownParent(parent)),
        };
        let evicted: HashSet<RouteId> = self.subtree_ids(id).into_iter().collect();

        if let Err(e) = self.check_conflicts(&plan, &evicted) {
            warn!(id = %id.short(), prefix, error = %e, "prefix change rejected");
            return Err(e);
        }

        let new_id = plan.id.clone();
        self.apply(&parent, plan, &evicted, Slot::Replace(index));

        info!(old = %id.short(), new = %new_id.short(), prefix, "route prefix changed");
        Ok(new_id)
    }

    /// Re-parent `id` (with its subtree) under `new_parent`.
    ///
    /// Placement follows [`attach`](Self::attach): a sibling with the same
    /// resulting identity is replaced in place, otherwise the node is
    /// appended. Moving a node under its current parent is a no-op.
    ///
    /// # Errors
    ///
    /// [`RouteError::NotFound`], [`RouteError::RootImmutable`],
    /// [`RouteError::UnknownParent`], [`RouteError::CyclicMove`] when
    /// `new_parent` lies inside the moved subtree, or
    /// [`RouteError::IdentityConflict`].
    pub fn move_to(&mut self, id: &RouteId, new_parent: &RouteId) -> RouteResult<RouteId> {
        let old_parent = self.parent_of(id)?;
        let target = self
            .routes
            .get(new_parent)
            .ok_or_else(|| RouteError::UnknownParent(new_parent.clone()))?;

        if old_parent == *new_parent {
            return Ok(id.clone());
        }

        let moved = self.subtree_ids(id);
        if moved.contains(new_parent) {
            warn!(id = %id.short(), parent = %new_parent.short(), "cyclic move rejected");
            return Err(RouteError::CyclicMove {
                id: id.clone(),
                parent: new_parent.clone(),
            });
        }

        let plan = plan_subtree(self.definition(id)?, target);
        let slot = match target.children.iter().position(|c| *c == plan.id) {
            Some(index) => Slot::Replace(index),
            None => Slot::Append,
        };

        let mut evicted: HashSet<RouteId> = moved.into_iter().collect();
        if matches!(slot, Slot::Replace(_)) {
            evicted.extend(self.subtree_ids(&plan.id));
        }

        self.check_conflicts(&plan, &evicted)?;

        if let Some(parent) = self.routes.get_mut(&old_parent) {
            parent.children.retain(|c| c != id);
        }
        let new_id = plan.id.clone();
        self.apply(new_parent, plan, &evicted, slot);

        info!(
            old = %id.short(),
            new = %new_id.short(),
            parent = %new_parent.short(),
            "route moved"
        );
        Ok(new_id)
    }

    /// Export the live subtree at `id` as a detached definition.
    ///
    /// The root exports as a group with prefix `/`.
    pub fn definition(&self, id: &RouteId) -> RouteResult<RouteNode> {
        let route = self.lookup(id)?;
        let children = route
            .children
            .iter()
            .map(|child| self.definition(child))
            .collect::<RouteResult<Vec<_>>>()?;

        Ok(RouteNode {
            kind: match route.kind {
                NodeKind::Root => NodeKind::Group,
                kind => kind,
            },
            prefix: route.prefix.clone(),
            param: route.param.clone(),
            name: route.name.clone(),
            description: route.description.clone(),
            methods: route.methods.clone(),
            handler: route.handler.clone(),
            middlewares: route.middlewares.clone(),
            enabled: route.enabled,
            children,
        })
    }

    fn lookup(&self, id: &RouteId) -> RouteResult<&Route> {
        self.routes
            .get(id)
            .ok_or_else(|| RouteError::NotFound(id.clone()))
    }

    fn lookup_mut(&mut self, id: &RouteId) -> RouteResult<&mut Route> {
        self.routes
            .get_mut(id)
            .ok_or_else(|| RouteError::NotFound(id.clone()))
    }

    // Parent id of a non-root node.
    fn parent_of(&self, id: &RouteId) -> RouteResult<RouteId> {
        self.lookup(id)?
            .parent
            .clone()
            .ok_or(RouteError::RootImmutable)
    }

    // Ids of `id` and all its descendants, pre-order. Empty for an unknown id.
    fn subtree_ids(&self, id: &RouteId) -> Vec<RouteId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];

        while let Some(current) = stack.pop() {
            if let Some(route) = self.routes.get(&current) {
                stack.extend(route.children.iter().rev().cloned());
                out.push(current);
            }
        }

        out
    }

    fn check_conflicts(&self, plan: &Plan, evicted: &HashSet<RouteId>) -> RouteResult<()> {
        let mut seen = HashSet::with_capacity(plan.routes.len());
        for route in &plan.routes {
            let taken = self.routes.contains_key(&route.id) && !evicted.contains(&route.id);
            if taken || !seen.insert(&route.id) {
                return Err(RouteError::IdentityConflict {
                    id: route.id.clone(),
                    url: route.url.clone(),
                });
            }
        }
        Ok(())
    }

    fn apply(&mut self, parent: &RouteId, plan: Plan, evicted: &HashSet<RouteId>, slot: Slot) {
        for id in evicted {
            self.routes.remove(id);
        }

        let Plan { id, routes } = plan;
        for route in routes {
            debug!(id = %route.id.short(), kind = %route.kind, url = %route.url, "route registered");
            self.routes.insert(route.id.clone(), route);
        }

        if let Some(parent) = self.routes.get_mut(parent) {
            match slot {
                Slot::Replace(index) => parent.children[index] = id,
                Slot::Append => parent.children.push(id),
            }
        }
    }
}

// Resolve `node` and its descendants under `parent`.
fn plan_subtree(node: RouteNode, parent: &Route) -> Plan {
    let (id, routes) = resolve_subtree(node, &parent.id, &parent.url);
    Plan { id, routes }
}

fn resolve_subtree(node: RouteNode, parent_id: &RouteId, parent_url: &str) -> (RouteId, Vec<Route>) {
    let url = path::resolve(Some(parent_url), &node.prefix, &node.param);
    let id = RouteId::derive(&url, &node.methods);

    // Siblings sharing an identity collapse into the first one's position.
    let mut children: Vec<(RouteId, Vec<Route>)> = Vec::with_capacity(node.children.len());
    for child in node.children {
        let resolved = resolve_subtree(child, &id, &url);
        match children.iter_mut().find(|(existing, _)| *existing == resolved.0) {
            Some(slot) => {
                debug!(id = %resolved.0.short(), "duplicate sibling replaced");
                *slot = resolved;
            }
            None => children.push(resolved),
        }
    }

    let route = Route {
        id: id.clone(),
        kind: node.kind,
        url,
        parent_url: parent_url.to_owned(),
        prefix: node.prefix,
        param: node.param,
        name: node.name,
        description: node.description,
        methods: node.methods,
        handler: node.handler,
        middlewares: node.middlewares,
        enabled: node.enabled,
        parent: Some(parent_id.clone()),
        children: children.iter().map(|(child, _)| child.clone()).collect(),
    };

    let mut routes = vec![route];
    for (_, subtree) in children {
        routes.extend(subtree);
    }
    (id, routes)
}
