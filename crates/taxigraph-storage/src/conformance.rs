//! Behaviour every backend must share, run from each backend's tests

use crate::error::StorageError;
use crate::traits::{ClearSummary, StorageBackend};
use taxigraph_core::{
    ConnectionRequest, Direction, Finding, NewEdge, Node, NodeKind, NodeType, PathQuery,
};

fn runway_end(id: &str, airport: &str, name: &str, heading: u16, runway_id: &str) -> Node {
    Node::new(id, airport, name, NodeKind::runway_end(heading, runway_id))
}

/// Four nodes and three bidirectional connections at KTST
pub async fn seed_ktst<S: StorageBackend + ?Sized>(store: &S) {
    for node in [
        runway_end("KTST_rwy_09", "KTST", "09", 90, "09_27").at(10.0, 50.0),
        runway_end("KTST_rwy_27", "KTST", "27", 270, "09_27").at(90.0, 50.0),
        Node::new("KTST_twy_A", "KTST", "A", NodeKind::taxiway_intersection(["A"])).at(50.0, 50.0),
        Node::new("KTST_ramp_main", "KTST", "Main Ramp", NodeKind::Ramp).at(50.0, 80.0),
    ] {
        store.create_node(node).await.unwrap();
    }

    for request in [
        ConnectionRequest::new("KTST_rwy_09", "KTST_twy_A", "A", 4, Direction::E),
        ConnectionRequest::new("KTST_twy_A", "KTST_ramp_main", "A", 2, Direction::E),
        ConnectionRequest::new("KTST_twy_A", "KTST_rwy_27", "A", 4, Direction::E).with_hold(),
    ] {
        store.create_connection(&request).await.unwrap();
    }
}

pub async fn node_round_trip<S: StorageBackend + ?Sized>(store: &S) {
    let node = Node::new(
        "KDPA_hold_A_27L",
        "KDPA",
        "A/27L",
        NodeKind::hold_short("27L", "A"),
    )
    .at(33.5, 71.25);

    let created = store.create_node(node.clone()).await.unwrap();
    assert_eq!(created, node);

    let fetched = store.get_node("KDPA_hold_A_27L").await.unwrap().unwrap();
    assert_eq!(fetched, node);
    assert!(store.get_node("KDPA_nope").await.unwrap().is_none());
}

pub async fn duplicate_id_leaves_original<S: StorageBackend + ?Sized>(store: &S) {
    let original = runway_end("KTST_rwy_09", "KTST", "09", 90, "09_27");
    store.create_node(original.clone()).await.unwrap();

    // Same id under another type and airport still collides
    let impostor = Node::new("KTST_rwy_09", "KXYZ", "Impostor", NodeKind::Fbo);
    let err = store.create_node(impostor).await.unwrap_err();
    assert!(matches!(err, StorageError::DuplicateId(id) if id == "KTST_rwy_09"));

    assert_eq!(store.get_node("KTST_rwy_09").await.unwrap().unwrap(), original);
    assert_eq!(store.list_nodes(None).await.unwrap().len(), 1);
}

pub async fn dangling_edge_rejected<S: StorageBackend + ?Sized>(store: &S) {
    store
        .create_node(Node::new("KTST_ramp", "KTST", "Ramp", NodeKind::Ramp))
        .await
        .unwrap();

    let err = store
        .create_edge(NewEdge::new("KTST_ramp", "KTST_ghost", "A", 1, Direction::N))
        .await
        .unwrap_err();
    match err {
        StorageError::DanglingReference { missing, .. } => assert_eq!(missing, "KTST_ghost"),
        other => panic!("expected dangling reference, got {other}"),
    }

    let err = store
        .create_edge(NewEdge::new("KTST_ghost", "KTST_ramp", "A", 1, Direction::N))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DanglingReference { missing, .. } if missing == "KTST_ghost"));

    assert!(store.list_edges(None).await.unwrap().is_empty());
}

pub async fn bidirectional_connection<S: StorageBackend + ?Sized>(store: &S) {
    for id in ["A", "B"] {
        store
            .create_node(Node::new(id, "KTST", id, NodeKind::taxiway_intersection([id])))
            .await
            .unwrap();
    }

    let request = ConnectionRequest::new("A", "B", "B", 3, Direction::N).with_hold();
    store.create_connection(&request).await.unwrap();

    let edges = store.list_edges(Some("KTST")).await.unwrap();
    assert_eq!(edges.len(), 2);

    let (forward, reverse) = (&edges[0], &edges[1]);
    assert_eq!((forward.from_id.as_str(), forward.to_id.as_str()), ("A", "B"));
    assert_eq!(forward.direction, Direction::N);
    assert_eq!((reverse.from_id.as_str(), reverse.to_id.as_str()), ("B", "A"));
    assert_eq!(reverse.direction, Direction::S);
    for edge in &edges {
        assert_eq!(edge.via, "B");
        assert_eq!(edge.distance, 3);
        assert!(edge.requires_hold);
        assert_eq!(edge.airport, "KTST");
    }
}

pub async fn listing_order_and_filters<S: StorageBackend + ?Sized>(store: &S) {
    for node in [
        Node::new("KZZZ_ramp", "KZZZ", "Ramp", NodeKind::Ramp),
        Node::new("KTST_twy_B", "KTST", "B", NodeKind::taxiway_intersection(["B"])),
        Node::new("KTST_fbo", "KTST", "Signature", NodeKind::Fbo),
        Node::new("KTST_twy_A", "KTST", "A", NodeKind::taxiway_intersection(["A"])),
        runway_end("KTST_rwy_27", "KTST", "27", 270, "09_27"),
    ] {
        store.create_node(node).await.unwrap();
    }

    let ids: Vec<String> = store
        .list_nodes(None)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(
        ids,
        vec!["KTST_fbo", "KTST_rwy_27", "KTST_twy_A", "KTST_twy_B", "KZZZ_ramp"]
    );
    assert_eq!(store.list_nodes(Some("KZZZ")).await.unwrap().len(), 1);
    assert_eq!(store.list_airports().await.unwrap(), vec!["KTST", "KZZZ"]);

    // Cross-airport edge belongs to its source airport
    store
        .create_edge(NewEdge::new("KZZZ_ramp", "KTST_fbo", "road", 9, Direction::W))
        .await
        .unwrap();
    store
        .create_edge(NewEdge::new("KTST_twy_A", "KTST_twy_B", "A", 1, Direction::E))
        .await
        .unwrap();

    let ktst = store.list_edges(Some("KTST")).await.unwrap();
    assert_eq!(ktst.len(), 1);
    assert_eq!(ktst[0].from_id, "KTST_twy_A");
    let all = store.list_edges(None).await.unwrap();
    assert_eq!(all[0].airport, "KZZZ");
    assert_eq!(all[1].airport, "KTST");

    let stats = store.stats(Some("KTST")).await.unwrap();
    assert_eq!(stats.total_nodes, 4);
    assert_eq!(stats.total_edges, 1);
    assert_eq!(stats.count(NodeType::TaxiwayIntersection), 2);
    assert!(!stats.nodes_by_type.contains_key(&NodeType::Ramp));

    let stats = store.stats(None).await.unwrap();
    assert_eq!(stats.total_nodes, 5);
    assert_eq!(stats.total_edges, 2);
}

pub async fn clear_one_then_all<S: StorageBackend + ?Sized>(store: &S) {
    seed_ktst(store).await;
    store
        .create_node(Node::new("KOTH_ramp", "KOTH", "Ramp", NodeKind::Ramp))
        .await
        .unwrap();
    store
        .create_node(Node::new("KOTH_fbo", "KOTH", "FBO", NodeKind::Fbo))
        .await
        .unwrap();
    store
        .create_connection(&ConnectionRequest::new("KOTH_ramp", "KOTH_fbo", "ramp", 1, Direction::S))
        .await
        .unwrap();
    // Incoming edge from another airport goes with the cleared node
    store
        .create_edge(NewEdge::new("KOTH_ramp", "KTST_ramp_main", "road", 10, Direction::E))
        .await
        .unwrap();

    let summary = store.clear(Some("KTST")).await.unwrap();
    assert_eq!(summary, ClearSummary { nodes: 4, edges: 7 });

    assert!(store.list_nodes(Some("KTST")).await.unwrap().is_empty());
    assert!(store.list_edges(Some("KTST")).await.unwrap().is_empty());
    assert_eq!(store.list_nodes(Some("KOTH")).await.unwrap().len(), 2);
    assert_eq!(store.list_edges(Some("KOTH")).await.unwrap().len(), 2);
    assert_eq!(store.list_airports().await.unwrap(), vec!["KOTH"]);

    let summary = store.clear(None).await.unwrap();
    assert_eq!(summary, ClearSummary { nodes: 2, edges: 2 });
    assert!(store.list_nodes(None).await.unwrap().is_empty());
    assert!(store.list_edges(None).await.unwrap().is_empty());

    // Clearing an empty store is fine
    assert_eq!(store.clear(None).await.unwrap(), ClearSummary::default());
}

pub async fn cross_airport_edge_stays_with_source<S: StorageBackend + ?Sized>(store: &S) {
    store
        .create_node(Node::new("KTST_term", "KTST", "Terminal", NodeKind::Terminal))
        .await
        .unwrap();
    store
        .create_node(Node::new("KOTH_ramp", "KOTH", "Ramp", NodeKind::Ramp))
        .await
        .unwrap();
    store
        .create_edge(NewEdge::new("KOTH_ramp", "KTST_term", "road", 3, Direction::E))
        .await
        .unwrap();

    assert!(store.list_edges(Some("KTST")).await.unwrap().is_empty());
    assert_eq!(store.list_edges(Some("KOTH")).await.unwrap().len(), 1);

    // Only the source airport sees the edge
    let report = store.validate("KTST").await.unwrap();
    assert_eq!(report.edge_count, 0);
    assert!(report.issues.contains(&Finding::OrphanNode {
        id: "KTST_term".to_string(),
        node_type: NodeType::Terminal,
    }));

    let report = store.validate("KOTH").await.unwrap();
    assert!(report.issues.iter().any(|f| matches!(
        f,
        Finding::DanglingReference { missing, .. } if missing == "KTST_term"
    )));
}

pub async fn ktst_scenario<S: StorageBackend + ?Sized>(store: &S) {
    seed_ktst(store).await;

    let outcome = store
        .find_path("KTST", "KTST_ramp_main", "KTST_rwy_27")
        .await
        .unwrap();
    let Some(path) = outcome.path().cloned() else {
        panic!("expected a path, got {outcome:?}");
    };
    assert_eq!(path.node_names, vec!["Main Ramp", "A", "27"]);
    assert_eq!(path.via, vec!["A", "A"]);
    assert_eq!(path.hold_count(), 1);

    let outcome = store
        .find_route("KTST", &PathQuery::new("KTST_rwy_09", "KTST_rwy_27").by_distance())
        .await
        .unwrap();
    assert_eq!(outcome.path().map(|p| p.total_distance), Some(8));

    // Wrong airport is a missing node, not an error
    let outcome = store
        .find_path("KXYZ", "KTST_ramp_main", "KTST_rwy_27")
        .await
        .unwrap();
    assert!(!outcome.is_found());

    let report = store.validate("KTST").await.unwrap();
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert_eq!(report.warnings, vec![Finding::FewNodes { count: 4 }]);
    assert_eq!((report.node_count, report.edge_count), (4, 6));
}
