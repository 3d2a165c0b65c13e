//! Dispatcher behaviour over heterogeneous suites

use graphsuite::graph::metadata::{attach_meta, NODE_CELL_META, NODE_EDIT_META, NODE_TYPE, HAS};
use graphsuite::graph::property::from_json;
use graphsuite::graph::{
    Graph, GraphEdit, GraphMeta, MemoryGraph, NodeBody, NodeCellMeta, NodePatch, PropertyMap,
    RelationshipBody, RelationshipPatch,
};
use graphsuite::query::{Searcher, Which};
use graphsuite::{CompositeId, Dispatcher, FsGraph, GraphError};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

async fn s1_s2(temp_dir: &TempDir) -> Dispatcher {
    let fs = FsGraph::open(temp_dir.path()).await.unwrap();
    Dispatcher::builder()
        .suite("S1", Arc::new(MemoryGraph::new()), ["A", "A2"], ["LinkA"])
        .suite("S2", Arc::new(fs), ["B"], ["LinkB"])
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_identity_is_stable_across_reads() {
    let temp_dir = TempDir::new().unwrap();
    let dispatcher = s1_s2(&temp_dir).await;
    let b = dispatcher
        .create_node(NodeBody::new("B", from_json(json!({"n": 1}))))
        .await
        .unwrap();

    let first = dispatcher.get_node(&b.id).await.unwrap().unwrap();
    let second = dispatcher.get_node(&b.id).await.unwrap().unwrap();
    assert!(first.id.is_same(&second.id));
    let searched = dispatcher.search_nodes(&Searcher::type_eq("B")).await.unwrap();
    assert!(searched[0].id.is_same(&first.id));

    // an equal composite built independently resolves too
    let rebuilt = CompositeId::from_graph_id(&b.id).unwrap().to_graph_id();
    assert!(dispatcher.get_node(&rebuilt).await.unwrap().is_some());
}

#[tokio::test]
async fn test_cross_suite_type_change() {
    let temp_dir = TempDir::new().unwrap();
    let dispatcher = s1_s2(&temp_dir).await;
    let a = dispatcher
        .create_node(NodeBody::new("A", from_json(json!({"k": "v"}))))
        .await
        .unwrap();

    match dispatcher.edit_node(&a.id, NodePatch::with_type("B")).await {
        Err(GraphError::CrossSuiteTypeChange { from_suite, to_suite, to_type, .. }) => {
            assert_eq!(from_suite, "S1");
            assert_eq!(to_suite, "S2");
            assert_eq!(to_type, "B");
        }
        other => panic!("expected CrossSuiteTypeChange, got {:?}", other),
    }
    assert_eq!(dispatcher.get_node(&a.id).await.unwrap().unwrap().node_type, "A");

    let moved = dispatcher.edit_node(&a.id, NodePatch::with_type("A2")).await.unwrap();
    assert_eq!(moved.node_type, "A2");
    assert_eq!(moved.properties, from_json(json!({"k": "v"})));

    assert!(matches!(
        dispatcher.edit_node(&a.id, NodePatch::with_type("Unmapped")).await,
        Err(GraphError::UnroutableType { .. })
    ));
}

#[tokio::test]
async fn test_relationships_across_suites() {
    let temp_dir = TempDir::new().unwrap();
    let dispatcher = s1_s2(&temp_dir).await;
    let a = dispatcher.create_node(NodeBody::new("A", PropertyMap::new())).await.unwrap();
    let b = dispatcher.create_node(NodeBody::new("B", PropertyMap::new())).await.unwrap();

    // stored in S2 with endpoints from both suites
    let link = dispatcher
        .create_relationship(RelationshipBody::new("LinkB", PropertyMap::new(), a.id.clone(), b.id.clone()))
        .await
        .unwrap();
    assert_eq!(CompositeId::from_graph_id(&link.id).unwrap().suite, "S2");
    assert_eq!(link.start_node_id, a.id);

    let from_a = dispatcher
        .search_relationships(&Searcher::adjacency(a.id.clone(), Which::Start))
        .await
        .unwrap();
    assert_eq!(from_a.len(), 1);
    assert_eq!(from_a[0].id, link.id);

    assert!(matches!(
        dispatcher
            .edit_relationship(&link.id, RelationshipPatch::with_type("LinkA"))
            .await,
        Err(GraphError::CrossSuiteTypeChange { .. })
    ));
    dispatcher.remove_relationship(&link.id).await.unwrap();
    assert!(dispatcher.get_relationship(&link.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_metadata_through_dispatcher() {
    let temp_dir = TempDir::new().unwrap();
    let meta_fs = FsGraph::open(temp_dir.path()).await.unwrap();
    let dispatcher = Dispatcher::builder()
        .suite("data", Arc::new(MemoryGraph::new()), ["Person"], Vec::<String>::new())
        .suite(
            "meta",
            Arc::new(meta_fs),
            [NODE_TYPE, NODE_CELL_META, NODE_EDIT_META],
            [HAS],
        )
        .build()
        .unwrap();

    // defaults before any metadata exists
    assert_eq!(
        dispatcher.get_node_cell_meta("Person").await.unwrap(),
        NodeCellMeta::default()
    );
    assert!(dispatcher
        .get_node_details_meta("Person")
        .await
        .unwrap()
        .fields
        .is_empty());

    attach_meta(
        &dispatcher,
        "Person",
        NODE_CELL_META,
        from_json(json!({"title": "$.fullName", "fields": ["$.age"]})),
    )
    .await
    .unwrap();
    attach_meta(
        &dispatcher,
        "Person",
        NODE_EDIT_META,
        from_json(json!({"fields": [{"path": "$.bio", "label": "Bio", "multiline": true}]})),
    )
    .await
    .unwrap();

    let cell = dispatcher.get_node_cell_meta("Person").await.unwrap();
    assert_eq!(cell.title, "$.fullName");
    assert_eq!(cell.fields, vec!["$.age".to_string()]);

    let details = dispatcher.get_node_details_meta("Person").await.unwrap();
    assert_eq!(details.fields.len(), 1);
    assert!(details.fields[0].multiline);

    // one NodeType node shared by both metadata entries
    let type_nodes = dispatcher.search_nodes(&Searcher::type_eq(NODE_TYPE)).await.unwrap();
    assert_eq!(type_nodes.len(), 1);
    assert_eq!(
        dispatcher.get_node_types().await.unwrap(),
        vec!["Node Cell Meta", "Node Edit Meta", "NodeType", "Person"]
    );
}
