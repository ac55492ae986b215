//! End-to-end behavior of a router assembled the way an application does it.

use std::sync::Arc;

use dynaroute::route::path::clean;
use dynaroute::{DynaRouter, HandlerRef, Method, NodeKind, RouteError, RouteId, RouteNode};

type Handler = Arc<dyn Fn(&str) -> String + Send + Sync>;

fn handler(name: &str) -> HandlerRef<Handler> {
    let owned = name.to_owned();
    let callable: Handler = Arc::new(move |input: &str| format!("{owned}({input})"));
    HandlerRef::new(name, callable)
}

// Root → /api → { /users → {list, show, create}, /orders → {list} }, /health
fn assemble() -> (DynaRouter<Handler>, Vec<RouteId>) {
    let router = DynaRouter::new();

    let users = RouteNode::group(
        "users",
        "Users",
        "User management",
        [
            router.get("List users", "", handler("app::users::ListHandle"), None),
            router.get("Show user", "", handler("app::users::ShowHandle"), Some("/:id")),
            router.post("Create user", "", handler("app::users::CreateHandle"), None),
        ],
    );
    let orders = RouteNode::group(
        "/orders/",
        "Orders",
        "",
        [router.get("List orders", "", handler("app::orders::ListHandle"), None)],
    );
    let api = RouteNode::group("/api", "API", "", [users, orders]).use_middleware(["auth"]);
    let health = router.any("Health", "", handler("app::ops::health_handle"), None);

    let ids = router.root([api, health]).expect("tree assembles");
    (router, ids)
}

fn urls(router: &DynaRouter<Handler>) -> Vec<String> {
    router.tree().iter().map(|r| r.url().to_owned()).collect()
}

#[test]
fn pre_order_tree() {
    let (router, _) = assemble();
    assert_eq!(
        urls(&router),
        [
            "/",
            "/api",
            "/api/users",
            "/api/users/list",
            "/api/users/show/:id",
            "/api/users/create",
            "/api/orders",
            "/api/orders/list",
            "/health",
        ]
    );
}

#[test]
fn every_url_is_the_cleaned_ancestor_join() {
    let (router, _) = assemble();
    let tree = router.tree();

    for route in &tree {
        let mut segments = vec![format!("{}{}", route.prefix(), route.param())];
        let mut parent = route.parent().cloned();
        while let Some(id) = parent {
            let ancestor = router.lookup(&id).unwrap();
            segments.push(format!("{}{}", ancestor.prefix(), ancestor.param()));
            parent = ancestor.parent().cloned();
        }
        segments.reverse();
        assert_eq!(clean(&segments.join("/")), route.url());

        let resolved = router.with_tree(|t| t.resolve_url(route.id())).unwrap();
        assert_eq!(resolved, route.url());
    }
}

#[test]
fn identities_are_url_and_methods() {
    let (router, _) = assemble();
    for route in router.tree() {
        assert_eq!(*route.id(), RouteId::derive(route.url(), route.methods()));
    }
}

#[test]
fn same_method_and_url_under_different_paths_differ() {
    let (router, _) = assemble();
    let users_list = RouteId::derive("/api/users/list", &[Method::Get]);
    let orders_list = RouteId::derive("/api/orders/list", &[Method::Get]);
    assert!(router.lookup(&users_list).is_some());
    assert!(router.lookup(&orders_list).is_some());
    assert_ne!(users_list, orders_list);
}

#[test]
fn registry_matches_reachable_nodes_after_mutations() {
    let (router, ids) = assemble();
    let api = ids[0].clone();
    let users = RouteId::derive("/api/users", &[]);

    router.detach(&users).unwrap();
    let moved = router.move_to(&ids[1], &api).unwrap();
    router
        .attach(&api, router.put("Update", "", handler("app::orders::UpdateHandle"), Some("/:id")))
        .unwrap();

    router.with_tree(|tree| {
        let reachable = tree.tree();
        assert_eq!(reachable.len(), tree.len());
        for route in reachable {
            assert!(tree.contains(route.id()));
        }
    });
    assert_eq!(router.lookup(&moved).unwrap().url(), "/api/health");
    assert!(router.lookup(&RouteId::derive("/api/users/list", &[Method::Get])).is_none());
}

#[test]
fn replacing_a_route_keeps_its_position() {
    let (router, _) = assemble();
    let users = RouteId::derive("/api/users", &[]);
    let before: Vec<RouteId> = router.lookup(&users).unwrap().children().to_vec();

    let replacement = router.get("Show user v2", "", handler("app::users::ShowHandle"), Some("/:id"));
    let id = router.attach(&users, replacement).unwrap();

    let after = router.lookup(&users).unwrap().children().to_vec();
    assert_eq!(before, after);
    assert_eq!(router.lookup(&id).unwrap().name(), "Show user v2");
}

#[test]
fn cascade_toggle_forgets_per_node_overrides() {
    let (router, ids) = assemble();
    let api = &ids[0];
    let show = RouteId::derive("/api/users/show/:id", &[Method::Get]);

    router.set_enabled(&show, false).unwrap();
    router.set_enabled(api, false).unwrap();
    assert!(router.flatten(api).unwrap().iter().all(|r| !r.is_enabled()));

    router.set_enabled(api, true).unwrap();
    assert!(router.flatten(api).unwrap().iter().all(|r| r.is_enabled()));
    assert!(router.is_active(&show));
}

#[test]
fn re_prefixing_a_group_moves_its_handlers() {
    let (router, _) = assemble();
    let orders = RouteId::derive("/api/orders", &[]);

    let renamed = router.set_prefix(&orders, "purchases").unwrap();

    let table: Vec<String> = router
        .active_handlers()
        .iter()
        .map(|(r, _)| r.url().to_owned())
        .collect();
    assert!(table.contains(&"/api/purchases/list".to_owned()));
    assert!(!table.contains(&"/api/orders/list".to_owned()));
    assert_eq!(router.lookup(&renamed).unwrap().kind(), NodeKind::Group);
}

#[test]
fn dispatch_table_resolves_callables() {
    let (router, _) = assemble();
    let table = router.active_handlers();
    let (route, callable) = table
        .iter()
        .find(|(r, _)| r.url() == "/api/users/show/:id")
        .unwrap();

    assert_eq!(route.handler_name(), Some("app::users::ShowHandle"));
    assert_eq!(callable("42"), "app::users::ShowHandle(42)");
    assert_eq!(router.middleware_chain(route.id()).unwrap(), Vec::<String>::new());
}

#[test]
fn unknown_parent_halts_assembly() {
    let router: DynaRouter<Handler> = DynaRouter::new();
    let ghost = RouteId::derive("/nowhere", &[]);
    let node = router.get("", "", handler("app::LostHandle"), None);

    let err = router.attach(&ghost, node).unwrap_err();
    assert!(matches!(err, RouteError::UnknownParent(_)));
    assert_eq!(router.tree().len(), 1);
}

#[test]
fn ids_round_trip_through_admin_strings() {
    let (router, ids) = assemble();
    let raw = ids[1].to_string();
    let parsed: RouteId = raw.parse().unwrap();
    assert_eq!(router.lookup(&parsed).unwrap().url(), "/health");
}

#[test]
fn tree_serializes_for_external_persistence() {
    let (router, _) = assemble();
    let json = serde_json::to_value(router.tree()).unwrap();
    let health = &json[8];
    assert_eq!(health["url"], "/health");
    assert_eq!(health["kind"], "handler");
    assert_eq!(health["methods"][0], "CONNECT");
    assert_eq!(health["handler"], "app::ops::health_handle");
}
