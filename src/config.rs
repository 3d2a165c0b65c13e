//! Server configuration
//!
//! Describes the suites to compose and the types each one owns. Loaded from
//! YAML (`.yaml`/`.yml`) or JSON (`.json`):
//!
//! ```yaml
//! port: 8080
//! suites:
//!   - name: people
//!     node_types: [Person, NodeType, Node Cell Meta]
//!     relationship_types: [Knows, Has]
//!     backend: { kind: memory }
//!   - name: notes
//!     node_types: [Note]
//!     backend: { kind: filesystem, root: ./data/notes, raw_text_types: [Note] }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::graph::{GraphError, GraphResult, MemoryGraph, SnapshotFile, Suite};
use crate::http::RemoteGraph;
use crate::persistence::{FsGraph, RawTextExtension};
use crate::sharding::Dispatcher;

/// Top-level configuration of the server binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
    pub suites: Vec<SuiteConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            suites: Vec::new(),
        }
    }
}

/// One named suite and the types routed to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub name: String,
    #[serde(default)]
    pub node_types: Vec<String>,
    #[serde(default)]
    pub relationship_types: Vec<String>,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Process-local, lost on exit
    Memory {
        #[serde(default)]
        id_prefix: Option<String>,
    },
    /// In-memory model persisted to one JSON snapshot file
    Snapshot {
        path: PathBuf,
        #[serde(default)]
        id_prefix: Option<String>,
    },
    Filesystem {
        root: PathBuf,
        #[serde(default)]
        id_prefix: Option<String>,
        /// Node types whose `content` property is kept in raw text files
        #[serde(default)]
        raw_text_types: Vec<String>,
    },
    /// Another graphsuite server
    Remote { url: String },
}

impl BackendConfig {
    pub async fn build(&self) -> GraphResult<Arc<dyn Suite>> {
        let suite: Arc<dyn Suite> = match self {
            BackendConfig::Memory { id_prefix } => {
                let graph = MemoryGraph::new();
                match id_prefix {
                    Some(prefix) => Arc::new(graph.with_id_prefix(prefix.clone())),
                    None => Arc::new(graph),
                }
            }
            BackendConfig::Snapshot { path, id_prefix } => {
                let graph = MemoryGraph::with_handler(SnapshotFile::new(path));
                match id_prefix {
                    Some(prefix) => Arc::new(graph.with_id_prefix(prefix.clone())),
                    None => Arc::new(graph),
                }
            }
            BackendConfig::Filesystem {
                root,
                id_prefix,
                raw_text_types,
            } => {
                let mut graph = FsGraph::open(root).await?;
                if let Some(prefix) = id_prefix {
                    graph = graph.with_id_prefix(prefix.clone());
                }
                if !raw_text_types.is_empty() {
                    graph = graph
                        .with_extension(Arc::new(RawTextExtension::new(raw_text_types.clone())));
                }
                Arc::new(graph)
            }
            BackendConfig::Remote { url } => Arc::new(RemoteGraph::new(url)),
        };
        Ok(suite)
    }
}

impl ServerConfig {
    pub fn from_yaml(text: &str) -> GraphResult<Self> {
        serde_yaml::from_str(text).map_err(|e| GraphError::Config(e.to_string()))
    }

    pub fn from_json(text: &str) -> GraphResult<Self> {
        serde_json::from_str(text).map_err(|e| GraphError::Config(e.to_string()))
    }

    /// Load a YAML or JSON file, chosen by extension
    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GraphError::Config(format!("cannot read {:?}: {}", path, e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            Some("json") => Self::from_json(&text),
            _ => Err(GraphError::Config(format!(
                "unsupported configuration format: {:?}",
                path
            ))),
        }
    }

    /// Instantiate every suite and compose them
    pub async fn build_dispatcher(&self) -> GraphResult<Dispatcher> {
        if self.suites.is_empty() {
            return Err(GraphError::Config("no suites configured".to_string()));
        }
        let mut builder = Dispatcher::builder();
        for suite in &self.suites {
            info!(
                "Configuring suite {} ({} node types, {} relationship types)",
                suite.name,
                suite.node_types.len(),
                suite.relationship_types.len()
            );
            let backend = suite.backend.build().await?;
            builder = builder.suite(
                suite.name.clone(),
                backend,
                suite.node_types.iter().cloned(),
                suite.relationship_types.iter().cloned(),
            );
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphEdit, GraphMeta, NodeBody, PropertyMap};
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_yaml("suites: []").unwrap();
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_parse_backends() {
        let config = ServerConfig::from_yaml(
            r#"
port: 9000
suites:
  - name: a
    node_types: [Person]
    backend: { kind: memory, id_prefix: "a-" }
  - name: b
    relationship_types: [Knows]
    backend: { kind: filesystem, root: /tmp/b, raw_text_types: [Note] }
  - name: c
    backend: { kind: remote, url: "http://localhost:1" }
"#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.suites.len(), 3);
        assert!(matches!(
            &config.suites[0].backend,
            BackendConfig::Memory { id_prefix: Some(p) } if p == "a-"
        ));
        assert!(config.suites[1].node_types.is_empty());
        assert!(matches!(&config.suites[2].backend, BackendConfig::Remote { .. }));
    }

    #[test]
    fn test_load_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let json_path = temp_dir.path().join("graph.json");
        std::fs::write(&json_path, r#"{"port": 1234, "suites": []}"#).unwrap();
        assert_eq!(ServerConfig::load(&json_path).unwrap().port, 1234);

        let toml_path = temp_dir.path().join("graph.toml");
        std::fs::write(&toml_path, "port = 1").unwrap();
        assert!(matches!(ServerConfig::load(&toml_path), Err(GraphError::Config(_))));
        assert!(matches!(
            ServerConfig::load(temp_dir.path().join("missing.yaml")),
            Err(GraphError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_build_dispatcher() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig {
            suites: vec![
                SuiteConfig {
                    name: "mem".to_string(),
                    node_types: vec!["Person".to_string()],
                    relationship_types: vec![],
                    backend: BackendConfig::Memory { id_prefix: None },
                },
                SuiteConfig {
                    name: "fs".to_string(),
                    node_types: vec!["Note".to_string()],
                    relationship_types: vec!["Mentions".to_string()],
                    backend: BackendConfig::Filesystem {
                        root: temp_dir.path().join("fs"),
                        id_prefix: None,
                        raw_text_types: vec!["Note".to_string()],
                    },
                },
            ],
            ..Default::default()
        };

        let dispatcher = config.build_dispatcher().await.unwrap();
        assert_eq!(dispatcher.get_node_types().await.unwrap(), vec!["Note", "Person"]);
        dispatcher
            .create_node(NodeBody::new("Note", PropertyMap::new()))
            .await
            .unwrap();
        assert!(temp_dir.path().join("fs/Note.node.json").exists());
    }

    #[tokio::test]
    async fn test_overlapping_types_rejected() {
        let suite = |name: &str| SuiteConfig {
            name: name.to_string(),
            node_types: vec!["Doc".to_string()],
            relationship_types: vec![],
            backend: BackendConfig::Memory { id_prefix: None },
        };
        let config = ServerConfig {
            suites: vec![suite("a"), suite("b")],
            ..Default::default()
        };
        assert!(matches!(
            config.build_dispatcher().await,
            Err(GraphError::Config(_))
        ));
        assert!(matches!(
            ServerConfig::default().build_dispatcher().await,
            Err(GraphError::Config(_))
        ));
    }
}
