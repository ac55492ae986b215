//! Route tree — hierarchical route definitions with derived URLs and identities.
//!
//! Routes are declared as a tree of [`RouteNode`]s and attached to a
//! [`RouteTree`]. Attaching resolves every node's absolute URL from its
//! ancestors' prefixes and derives a content-addressed [`RouteId`]:
//!
//! | Node                          | Resolved URL     | Identity                     |
//! |-------------------------------|------------------|------------------------------|
//! | root                          | `/`              | `sha256("/")`                |
//! | group `/api`                  | `/api`           | `sha256("/api")`             |
//! | `GET` handler `/user` `/:id`  | `/api/user/:id`  | `sha256("/api/user/:idGET")` |
//!
//! Two handlers with the same URL and method set share an identity, so
//! attaching the second one under the same parent replaces the first in place.

use thiserror::Error;

pub mod identity;
pub mod node;
pub mod path;
pub mod tree;

pub use identity::RouteId;
pub use node::{NodeKind, Route, RouteNode};
pub use tree::RouteTree;

/// Errors produced while building or mutating a route tree.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("parent route {0} is not attached")]
    UnknownParent(RouteId),

    #[error("route {0} not found")]
    NotFound(RouteId),

    #[error("route `{name}` declares no HTTP methods")]
    EmptyMethodSet { name: String },

    #[error("route {url} ({id}) is already registered elsewhere in the tree")]
    IdentityConflict { id: RouteId, url: String },

    #[error("cannot move route {id} under its own subtree ({parent})")]
    CyclicMove { id: RouteId, parent: RouteId },

    #[error("the root route cannot be detached, moved or re-prefixed")]
    RootImmutable,

    #[error("invalid route id `{0}`")]
    InvalidId(String),

    #[error("invalid router configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type RouteResult<T> = Result<T, RouteError>;
