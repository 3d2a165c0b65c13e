//! HTTP handlers exposing a suite's contract methods

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use super::rpc::{EditNodeRequest, EditRelationshipRequest, IdRequest, SearchRequest};
use crate::graph::{GraphError, Node, NodeBody, Relationship, RelationshipBody, Suite};

/// Handler state: the suite being served
pub type SharedSuite = Arc<dyn Suite>;

/// A `GraphError` rendered as `{ "error": message }` with a matching status
#[derive(Debug)]
pub struct ApiError(pub GraphError);

impl From<GraphError> for ApiError {
    fn from(e: GraphError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GraphError::NotFound { .. } => StatusCode::NOT_FOUND,
            GraphError::InvalidIdentity(_)
            | GraphError::InvalidPath(_)
            | GraphError::InvalidType(_)
            | GraphError::UnsupportedSearcher(_)
            | GraphError::UnroutableType { .. } => StatusCode::BAD_REQUEST,
            GraphError::CrossSuiteTypeChange { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn get_node(
    State(graph): State<SharedSuite>,
    Json(req): Json<IdRequest>,
) -> ApiResult<Option<Node>> {
    Ok(Json(graph.get_node(&req.id).await?))
}

pub async fn get_relationship(
    State(graph): State<SharedSuite>,
    Json(req): Json<IdRequest>,
) -> ApiResult<Option<Relationship>> {
    Ok(Json(graph.get_relationship(&req.id).await?))
}

pub async fn search_nodes(
    State(graph): State<SharedSuite>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<Vec<Node>> {
    Ok(Json(graph.search_nodes(&req.searcher).await?))
}

pub async fn search_relationships(
    State(graph): State<SharedSuite>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<Vec<Relationship>> {
    Ok(Json(graph.search_relationships(&req.searcher).await?))
}

pub async fn create_node(
    State(graph): State<SharedSuite>,
    Json(body): Json<NodeBody>,
) -> ApiResult<Node> {
    Ok(Json(graph.create_node(body).await?))
}

pub async fn edit_node(
    State(graph): State<SharedSuite>,
    Json(req): Json<EditNodeRequest>,
) -> ApiResult<Node> {
    Ok(Json(graph.edit_node(&req.id, req.patch).await?))
}

pub async fn remove_node(
    State(graph): State<SharedSuite>,
    Json(req): Json<IdRequest>,
) -> ApiResult<()> {
    graph.remove_node(&req.id).await?;
    Ok(Json(()))
}

pub async fn create_relationship(
    State(graph): State<SharedSuite>,
    Json(body): Json<RelationshipBody>,
) -> ApiResult<Relationship> {
    Ok(Json(graph.create_relationship(body).await?))
}

pub async fn edit_relationship(
    State(graph): State<SharedSuite>,
    Json(req): Json<EditRelationshipRequest>,
) -> ApiResult<Relationship> {
    Ok(Json(graph.edit_relationship(&req.id, req.patch).await?))
}

pub async fn remove_relationship(
    State(graph): State<SharedSuite>,
    Json(req): Json<IdRequest>,
) -> ApiResult<()> {
    graph.remove_relationship(&req.id).await?;
    Ok(Json(()))
}

pub async fn get_node_types(State(graph): State<SharedSuite>) -> ApiResult<Vec<String>> {
    Ok(Json(graph.get_node_types().await?))
}

pub async fn get_relationship_types(State(graph): State<SharedSuite>) -> ApiResult<Vec<String>> {
    Ok(Json(graph.get_relationship_types().await?))
}
