//! Per-type hooks around node persistence
//!
//! An extension governs the node types it lists. `re_write_node` runs on
//! the caller's view before a governed node is written, `re_read_node` runs
//! on the stored form right after a document is read, so searches and
//! lookups only ever see the caller's view.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::layout::{raw_file_name, RAW_DIR};
use crate::graph::{GraphResult, Node, PropertyMap};

#[async_trait]
pub trait NodeExtension: Send + Sync {
    /// Node types this extension governs
    fn types(&self) -> &[String];

    fn governs(&self, node_type: &str) -> bool {
        self.types().iter().any(|t| t == node_type)
    }

    /// Turn a stored node back into the caller's view
    async fn re_read_node(&self, root: &Path, node: &mut Node) -> GraphResult<()>;

    /// Turn the caller's view into the stored form
    async fn re_write_node(&self, root: &Path, node: &mut Node) -> GraphResult<()>;

    /// Release side storage of a stored node that leaves this extension
    async fn discard_node(&self, _root: &Path, _node: &Node) -> GraphResult<()> {
        Ok(())
    }
}

/// Default property holding the raw text
pub const CONTENT_PROPERTY: &str = "content";
/// Property recording the side file in the stored form
pub const CONTENT_FILE_PROPERTY: &str = "contentFile";

/// Keeps a large text property in `raw/{id}.txt` instead of the JSON document
#[derive(Debug, Clone)]
pub struct RawTextExtension {
    types: Vec<String>,
    property: String,
}

impl RawTextExtension {
    pub fn new<I>(types: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            property: CONTENT_PROPERTY.to_string(),
        }
    }

    /// Use a property other than `content`
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }
}

#[async_trait]
impl NodeExtension for RawTextExtension {
    fn types(&self) -> &[String] {
        &self.types
    }

    async fn re_read_node(&self, root: &Path, node: &mut Node) -> GraphResult<()> {
        let file = match node.properties.get(CONTENT_FILE_PROPERTY) {
            Some(Value::String(file)) => file.clone(),
            _ => return Ok(()),
        };
        let text = match fs::read_to_string(root.join(RAW_DIR).join(&file)).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        replace_key(
            &mut node.properties,
            CONTENT_FILE_PROPERTY,
            &self.property,
            Value::String(text),
        );
        Ok(())
    }

    async fn re_write_node(&self, root: &Path, node: &mut Node) -> GraphResult<()> {
        let text = match node.properties.get(&self.property) {
            Some(Value::String(text)) => text.clone(),
            _ => return Ok(()),
        };
        let file = raw_file_name(node.id.expect_str()?);
        let dir = root.join(RAW_DIR);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&file), text).await?;
        debug!("Wrote raw text of {} to {}", node.id, file);

        let property = self.property.clone();
        replace_key(
            &mut node.properties,
            &property,
            CONTENT_FILE_PROPERTY,
            Value::String(file),
        );
        Ok(())
    }

    async fn discard_node(&self, root: &Path, node: &Node) -> GraphResult<()> {
        let Some(Value::String(file)) = node.properties.get(CONTENT_FILE_PROPERTY) else {
            return Ok(());
        };
        match fs::remove_file(root.join(RAW_DIR).join(file)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Swap key `from` for `to` carrying `value`, at the position `from` held
fn replace_key(properties: &mut PropertyMap, from: &str, to: &str, value: Value) {
    let mut value = Some(value);
    for (key, old) in std::mem::take(properties) {
        if key == from {
            if let Some(value) = value.take() {
                properties.insert(to.to_string(), value);
            }
        } else {
            properties.insert(key, old);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::from_json;
    use crate::graph::GraphId;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_split_and_merge() {
        let temp_dir = TempDir::new().unwrap();
        let ext = RawTextExtension::new(["Note"]);
        let mut node = Node::new(
            GraphId::from("n1"),
            "Note",
            from_json(json!({"title": "t", "content": "long text"})),
        );

        ext.re_write_node(temp_dir.path(), &mut node).await.unwrap();
        assert!(node.properties.get("content").is_none());
        assert_eq!(node.properties.get("contentFile"), Some(&json!("n1.txt")));
        let on_disk = std::fs::read_to_string(temp_dir.path().join("raw/n1.txt")).unwrap();
        assert_eq!(on_disk, "long text");

        ext.re_read_node(temp_dir.path(), &mut node).await.unwrap();
        assert_eq!(node.properties.get("content"), Some(&json!("long text")));
        assert!(node.properties.get("contentFile").is_none());
    }

    #[tokio::test]
    async fn test_key_order_survives_split_and_merge() {
        let temp_dir = TempDir::new().unwrap();
        let ext = RawTextExtension::new(["Note"]);
        let mut node = Node::new(
            GraphId::from("n1"),
            "Note",
            from_json(json!({"a": 1, "content": "text", "z": 2})),
        );
        let keys = |node: &Node| node.properties.keys().cloned().collect::<Vec<_>>();

        ext.re_write_node(temp_dir.path(), &mut node).await.unwrap();
        assert_eq!(keys(&node), vec!["a", "contentFile", "z"]);
        ext.re_read_node(temp_dir.path(), &mut node).await.unwrap();
        assert_eq!(keys(&node), vec!["a", "content", "z"]);
    }

    #[tokio::test]
    async fn test_non_text_content_stays_inline() {
        let temp_dir = TempDir::new().unwrap();
        let ext = RawTextExtension::new(["Note"]).with_property("body");
        let mut node = Node::new(GraphId::from("n1"), "Note", from_json(json!({"body": [1, 2]})));
        ext.re_write_node(temp_dir.path(), &mut node).await.unwrap();
        assert_eq!(node.properties.get("body"), Some(&json!([1, 2])));
        assert!(!temp_dir.path().join("raw").exists());
    }

    #[test]
    fn test_governs() {
        let ext = RawTextExtension::new(vec!["Note".to_string()]);
        assert!(ext.governs("Note"));
        assert!(!ext.governs("Person"));
    }
}
