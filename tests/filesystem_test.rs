//! Filesystem engine scenarios checked against the on-disk layout

use graphsuite::graph::property::from_json;
use graphsuite::graph::{Graph, GraphEdit, GraphMeta, NodeBody, NodePatch, PropertyMap};
use graphsuite::{FsGraph, GraphError, RawTextExtension};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn read_json(path: impl AsRef<Path>) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

fn ids_in(doc: &Value) -> Vec<String> {
    doc["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_type_change_moves_between_documents() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let graph = FsGraph::open(root).await.unwrap();

    let node = graph
        .create_node(NodeBody::new("X", from_json(json!({"a": 1}))))
        .await
        .unwrap();
    let id = node.id.as_str().unwrap().to_string();

    let edited = graph.edit_node(&node.id, NodePatch::with_type("Y")).await.unwrap();
    assert_eq!(edited.node_type, "Y");
    assert_eq!(edited.properties, from_json(json!({"a": 1})));

    assert!(!ids_in(&read_json(root.join("X.node.json"))).contains(&id));
    assert!(ids_in(&read_json(root.join("Y.node.json"))).contains(&id));
    assert_eq!(read_json(root.join("node.id2type.json"))["data"][&id], json!("Y"));
    assert_eq!(read_json(root.join("node.types.json")), json!({"data": ["X", "Y"]}));

    let fetched = graph.get_node(&node.id).await.unwrap().unwrap();
    assert_eq!(fetched.node_type, "Y");
}

#[tokio::test]
async fn test_relationship_documents() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let graph = FsGraph::open(root).await.unwrap().with_id_prefix("fs-");

    let a = graph.create_node(NodeBody::new("A", PropertyMap::new())).await.unwrap();
    let b = graph.create_node(NodeBody::new("B", PropertyMap::new())).await.unwrap();
    let rel = graph
        .create_relationship(graphsuite::RelationshipBody::new(
            "Links",
            from_json(json!({"w": 2})),
            a.id.clone(),
            b.id.clone(),
        ))
        .await
        .unwrap();

    let rel_id = rel.id.as_str().unwrap().to_string();
    assert!(rel_id.starts_with("fs-"));
    let doc = read_json(root.join("Links.relationship.json"));
    assert_eq!(doc["data"][0]["startNodeId"], json!(a.id.as_str().unwrap()));
    assert_eq!(doc["data"][0]["endNodeId"], json!(b.id.as_str().unwrap()));
    assert_eq!(
        read_json(root.join("relationship.id2type.json"))["data"][&rel_id],
        json!("Links")
    );
    assert_eq!(graph.get_node_types().await.unwrap(), vec!["A", "B"]);
    assert_eq!(graph.get_relationship_types().await.unwrap(), vec!["Links"]);

    // node removal does not cascade
    graph.remove_node(&a.id).await.unwrap();
    assert!(graph.get_relationship(&rel.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_raw_text_extension_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let graph = FsGraph::open(root)
        .await
        .unwrap()
        .with_extension(Arc::new(RawTextExtension::new(["Note"])));

    let note = graph
        .create_node(NodeBody::new(
            "Note",
            from_json(json!({"title": "draft", "content": "line one\nline two"})),
        ))
        .await
        .unwrap();
    let id = note.id.as_str().unwrap().to_string();

    let stored = &read_json(root.join("Note.node.json"))["data"][0]["properties"];
    assert_eq!(stored["contentFile"], json!(format!("{}.txt", id)));
    assert!(stored.get("content").is_none());
    assert_eq!(
        std::fs::read_to_string(root.join("raw").join(format!("{}.txt", id))).unwrap(),
        "line one\nline two"
    );

    // a patch without properties keeps the text
    let retitled = graph.edit_node(&note.id, NodePatch::with_type("Note")).await.unwrap();
    assert_eq!(retitled.properties["content"], json!("line one\nline two"));

    // replacing the bag rewrites the raw file
    let rewritten = graph
        .edit_node(
            &note.id,
            NodePatch::with_properties(from_json(json!({"title": "final", "content": "done"}))),
        )
        .await
        .unwrap();
    assert_eq!(rewritten.properties["content"], json!("done"));
    let fetched = graph.get_node(&note.id).await.unwrap().unwrap();
    assert_eq!(fetched.properties, rewritten.properties);

    // leaving the governed type brings the text back inline
    let moved = graph.edit_node(&note.id, NodePatch::with_type("Plain")).await.unwrap();
    assert_eq!(moved.properties["content"], json!("done"));
    assert!(!root.join("raw").join(format!("{}.txt", id)).exists());
    let stored = &read_json(root.join("Plain.node.json"))["data"][0]["properties"];
    assert_eq!(stored["content"], json!("done"));
}

#[tokio::test]
async fn test_failed_edit_leaves_state() {
    let temp_dir = TempDir::new().unwrap();
    let graph = FsGraph::open(temp_dir.path()).await.unwrap();
    let node = graph.create_node(NodeBody::new("A", PropertyMap::new())).await.unwrap();

    assert!(matches!(
        graph.edit_node(&node.id, NodePatch::with_type("bad/type")).await,
        Err(GraphError::InvalidType(_))
    ));
    assert_eq!(graph.get_node(&node.id).await.unwrap().unwrap().node_type, "A");
}

#[tokio::test]
async fn test_concurrent_creates_are_serialized() {
    let temp_dir = TempDir::new().unwrap();
    let graph = Arc::new(FsGraph::open(temp_dir.path()).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..16 {
        let graph = Arc::clone(&graph);
        handles.push(tokio::spawn(async move {
            graph
                .create_node(NodeBody::new(if i % 2 == 0 { "Even" } else { "Odd" }, PropertyMap::new()))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let all = graph.search_nodes(&graphsuite::Searcher::True).await.unwrap();
    assert_eq!(all.len(), 16);
    let index = read_json(temp_dir.path().join("node.id2type.json"));
    assert_eq!(index["data"].as_object().unwrap().len(), 16);
}
