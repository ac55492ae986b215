//! Readers flattening the tree while an administrator mutates it.

use std::sync::Arc;

use dynaroute::{DynaRouter, HandlerRef, RouteId, RouteNode};

type Handler = Arc<dyn Fn() -> u32 + Send + Sync>;

fn handler(name: &str, value: u32) -> HandlerRef<Handler> {
    let callable: Handler = Arc::new(move || value);
    HandlerRef::new(name, callable)
}

// A group of `width` GET handlers, all of which must be visible together or not at all.
fn batch(router: &DynaRouter<Handler>, round: usize, width: usize) -> RouteNode {
    let children: Vec<RouteNode> = (0..width)
        .map(|i| {
            let name = format!("bench::Item{i}Handle");
            router.get(format!("item {i}"), "", handler(&name, i as u32), None)
        })
        .collect();
    RouteNode::group(&format!("/round{round}"), "", "", children)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_see_partial_subtrees() {
    const ROUNDS: usize = 200;
    const WIDTH: usize = 16;

    let router: Arc<DynaRouter<Handler>> = Arc::new(DynaRouter::new());
    let root = router.root_id();

    let writer = {
        let router = Arc::clone(&router);
        tokio::task::spawn_blocking(move || {
            for round in 0..ROUNDS {
                let id = router.attach(&root, batch(&router, round, WIDTH)).unwrap();
                if round % 2 == 0 {
                    router.set_enabled(&id, false).unwrap();
                }
                if round % 3 == 0 {
                    router.detach(&id).unwrap();
                }
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let router = Arc::clone(&router);
            tokio::task::spawn_blocking(move || {
                for _ in 0..ROUNDS {
                    router.with_tree(|tree| {
                        let nodes = tree.tree();
                        assert_eq!(nodes.len(), tree.len());
                        for group in nodes.iter().filter(|r| r.parent() == Some(tree.root_id())) {
                            assert_eq!(group.children().len(), WIDTH);
                            let flat = tree.flatten(group.id()).unwrap();
                            let enabled = flat.iter().filter(|r| r.is_enabled()).count();
                            assert!(enabled == 0 || enabled == flat.len());
                        }
                    });
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }

    let expected_groups = (0..ROUNDS).filter(|r| r % 3 != 0).count();
    let root_children = router.lookup(&router.root_id()).unwrap().children().len();
    assert_eq!(root_children, expected_groups);
    assert_eq!(router.tree().len(), 1 + expected_groups * (WIDTH + 1));
}

#[tokio::test]
async fn router_is_shareable_across_tasks() {
    let router: Arc<DynaRouter<Handler>> = Arc::new(DynaRouter::new());
    let root = router.root_id();

    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let router = Arc::clone(&router);
            let root: RouteId = root.clone();
            tokio::spawn(async move {
                let name = format!("svc::Worker{i}Handle");
                let node = router.post(format!("worker {i}"), "", handler(&name, i), None);
                router.attach(&root, node).unwrap()
            })
        })
        .collect();

    for handle in handles {
        let id = handle.await.unwrap();
        assert!(router.lookup(&id).is_some());
    }
    assert_eq!(router.active_handlers().len(), 8);
}
