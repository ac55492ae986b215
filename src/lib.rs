//! # dynaroute
//!
//! The dynamic route-tree manager of the rttp HTTP framework.
//!
//! Routes are declared as a tree of groups and handler leaves. Attaching a
//! subtree resolves every node's absolute URL from its ancestors and derives a
//! stable, content-addressed identity from that URL and the node's methods.
//! The live tree can then be inspected and changed at runtime (attach,
//! replace, re-prefix, move, detach, enable/disable) while it stays consistent
//! with its identity index.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dynaroute::{DynaRouter, HandlerRef, RouteNode};
//!
//! type Handler = Arc<dyn Fn() -> &'static str + Send + Sync>;
//!
//! fn ok() -> &'static str {
//!     "ok"
//! }
//!
//! let router: DynaRouter<Handler> = DynaRouter::new();
//! let health: Handler = Arc::new(ok);
//! let ids = router
//!     .root([RouteNode::group("/ops", "Ops", "Operational endpoints", [
//!         router.get("Health", "Liveness probe", HandlerRef::new("ops::HealthHandle", health), None),
//!     ])])
//!     .unwrap();
//!
//! // Toggle the whole group without redeploying.
//! router.set_enabled(&ids[0], false).unwrap();
//! assert!(router.active_handlers().is_empty());
//! ```
//!
//! Serving requests is not part of this crate: a dispatch engine reads
//! [`DynaRouter::active_handlers`] and [`DynaRouter::middleware_chain`] to build
//! its matcher.

pub mod config;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod route;
pub mod router;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use config::RouterConfig;
pub use handler::{HandlerRef, HandlerRegistry};
pub use http::Method;
pub use middleware::MiddlewareChain;
pub use route::{NodeKind, Route, RouteError, RouteId, RouteNode, RouteResult, RouteTree};
pub use router::DynaRouter;
