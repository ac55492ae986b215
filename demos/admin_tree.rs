//! Assemble a route tree at start-up, then administer it like an admin UI would.
//!
//! Run with `RUST_LOG=debug cargo run --example admin_tree` to see every node
//! being registered.

use std::sync::Arc;

use dynaroute::{DynaRouter, HandlerRef, RouteNode, RouterConfig};
use tracing_subscriber::EnvFilter;

type Handler = Arc<dyn Fn(&str) -> String + Send + Sync>;

fn list_handle(_: &str) -> String {
    "[alice, bob]".to_owned()
}

fn show_handle(id: &str) -> String {
    format!("user {id}")
}

fn status_handle(_: &str) -> String {
    "ok".to_owned()
}

fn wrap(f: fn(&str) -> String) -> Handler {
    Arc::new(f)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RouterConfig::from_json(r#"{"before":["request_id"],"after":["access_log"]}"#)?;
    let router: DynaRouter<Handler> = DynaRouter::with_config(&config);

    let users = RouteNode::group(
        "/users",
        "Users",
        "User directory",
        [
            router.get("List", "All users", dynaroute::handler!(list_handle, wrap), None),
            router.get("Show", "One user", dynaroute::handler!(show_handle, wrap), Some("/:id")),
        ],
    )
    .use_middleware(["auth"]);
    let status = router.get("Status", "Health probe", HandlerRef::new("ops::StatusHandle", wrap(status_handle)), None);

    let ids = router.root([RouteNode::group("/api", "API", "", [users]), status])?;

    println!("── start-up tree ──");
    for route in router.tree() {
        println!("{:<8} {:<20} {}", route.kind(), route.url(), route.id().short());
    }

    // An operator takes the API offline, renames it, and brings it back.
    router.set_enabled(&ids[0], false)?;
    println!("active after disable: {}", router.active_handlers().len());

    let api = router.set_prefix(&ids[0], "v2")?;
    router.set_enabled(&api, true)?;

    println!("── dispatch table ──");
    for (route, handler) in router.active_handlers() {
        let chain = router.middleware_chain(route.id())?.join(" → ");
        println!("{:<24} [{}] {}", route.url(), chain, handler("7"));
    }

    println!("── persisted form ──");
    println!("{}", serde_json::to_string_pretty(&router.definition(&router.root_id())?)?);

    Ok(())
}
