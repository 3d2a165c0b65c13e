//! RemoteGraph: a suite forwarding every call to a transport server

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::rpc::{self, EditNodeRequest, EditRelationshipRequest, IdRequest, SearchRequest};
use crate::graph::{
    EntityClass, Graph, GraphEdit, GraphError, GraphId, GraphMeta, GraphResult, Node, NodeBody,
    NodePatch, Relationship, RelationshipBody, RelationshipPatch,
};
use crate::query::Searcher;

/// Network suite that connects to a running transport server.
///
/// Ids are passed through untouched, so a `RemoteGraph` in front of a
/// dispatcher speaks composite ids.
#[derive(Debug, Clone)]
pub struct RemoteGraph {
    base_url: String,
    http_client: Client,
}

impl RemoteGraph {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:8080`
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> GraphResult<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GraphError::Transport {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| GraphError::Transport {
            status: Some(status.as_u16()),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&bytes)
                .ok()
                .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            return Err(GraphError::Transport {
                status: Some(status.as_u16()),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| GraphError::Transport {
            status: Some(status.as_u16()),
            message: format!("unreadable {} response: {}", method, e),
        })
    }

    async fn call_void<B>(&self, method: &str, body: &B) -> GraphResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let _: serde_json::Value = self.call(method, body).await?;
        Ok(())
    }
}

/// The server answers 404 only for `NotFound`; restore it for id-addressed edits
fn restore_not_found(error: GraphError, class: EntityClass, id: &GraphId) -> GraphError {
    match error {
        GraphError::Transport {
            status: Some(status),
            ..
        } if status == StatusCode::NOT_FOUND.as_u16() => GraphError::not_found(class, id),
        other => other,
    }
}

#[async_trait]
impl Graph for RemoteGraph {
    async fn get_node(&self, id: &GraphId) -> GraphResult<Option<Node>> {
        self.call(rpc::GET_NODE, &IdRequest { id: id.clone() }).await
    }

    async fn get_relationship(&self, id: &GraphId) -> GraphResult<Option<Relationship>> {
        self.call(rpc::GET_RELATIONSHIP, &IdRequest { id: id.clone() })
            .await
    }

    async fn search_nodes(&self, searcher: &Searcher) -> GraphResult<Vec<Node>> {
        let req = SearchRequest {
            searcher: searcher.clone(),
        };
        self.call(rpc::SEARCH_NODES, &req).await
    }

    async fn search_relationships(&self, searcher: &Searcher) -> GraphResult<Vec<Relationship>> {
        let req = SearchRequest {
            searcher: searcher.clone(),
        };
        self.call(rpc::SEARCH_RELATIONSHIPS, &req).await
    }
}

#[async_trait]
impl GraphEdit for RemoteGraph {
    async fn create_node(&self, body: NodeBody) -> GraphResult<Node> {
        self.call(rpc::CREATE_NODE, &body).await
    }

    async fn edit_node(&self, id: &GraphId, patch: NodePatch) -> GraphResult<Node> {
        let req = EditNodeRequest {
            id: id.clone(),
            patch,
        };
        self.call(rpc::EDIT_NODE, &req)
            .await
            .map_err(|e| restore_not_found(e, EntityClass::Node, id))
    }

    async fn remove_node(&self, id: &GraphId) -> GraphResult<()> {
        self.call_void(rpc::REMOVE_NODE, &IdRequest { id: id.clone() })
            .await
            .map_err(|e| restore_not_found(e, EntityClass::Node, id))
    }

    async fn create_relationship(&self, body: RelationshipBody) -> GraphResult<Relationship> {
        self.call(rpc::CREATE_RELATIONSHIP, &body).await
    }

    async fn edit_relationship(
        &self,
        id: &GraphId,
        patch: RelationshipPatch,
    ) -> GraphResult<Relationship> {
        let req = EditRelationshipRequest {
            id: id.clone(),
            patch,
        };
        self.call(rpc::EDIT_RELATIONSHIP, &req)
            .await
            .map_err(|e| restore_not_found(e, EntityClass::Relationship, id))
    }

    async fn remove_relationship(&self, id: &GraphId) -> GraphResult<()> {
        self.call_void(rpc::REMOVE_RELATIONSHIP, &IdRequest { id: id.clone() })
            .await
            .map_err(|e| restore_not_found(e, EntityClass::Relationship, id))
    }
}

#[async_trait]
impl GraphMeta for RemoteGraph {
    async fn get_node_types(&self) -> GraphResult<Vec<String>> {
        self.call(rpc::GET_NODE_TYPES, &json!({})).await
    }

    async fn get_relationship_types(&self) -> GraphResult<Vec<String>> {
        self.call(rpc::GET_RELATIONSHIP_TYPES, &json!({})).await
    }
}
