//! HTTP server exposing a suite over the JSON transport

use axum::{routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::handler;
use super::rpc;
use crate::graph::{GraphResult, Suite};

/// Build the transport router for `graph`
pub fn router(graph: Arc<dyn Suite>) -> Router {
    Router::new()
        .route(&format!("/{}", rpc::GET_NODE), post(handler::get_node))
        .route(&format!("/{}", rpc::GET_RELATIONSHIP), post(handler::get_relationship))
        .route(&format!("/{}", rpc::SEARCH_NODES), post(handler::search_nodes))
        .route(&format!("/{}", rpc::SEARCH_RELATIONSHIPS), post(handler::search_relationships))
        .route(&format!("/{}", rpc::CREATE_NODE), post(handler::create_node))
        .route(&format!("/{}", rpc::EDIT_NODE), post(handler::edit_node))
        .route(&format!("/{}", rpc::REMOVE_NODE), post(handler::remove_node))
        .route(&format!("/{}", rpc::CREATE_RELATIONSHIP), post(handler::create_relationship))
        .route(&format!("/{}", rpc::EDIT_RELATIONSHIP), post(handler::edit_relationship))
        .route(&format!("/{}", rpc::REMOVE_RELATIONSHIP), post(handler::remove_relationship))
        .route(&format!("/{}", rpc::GET_NODE_TYPES), post(handler::get_node_types))
        .route(&format!("/{}", rpc::GET_RELATIONSHIP_TYPES), post(handler::get_relationship_types))
        .layer(CorsLayer::permissive())
        .with_state(graph)
}

/// HTTP server serving one suite
pub struct HttpServer {
    graph: Arc<dyn Suite>,
    address: String,
    port: u16,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(graph: Arc<dyn Suite>, address: impl Into<String>, port: u16) -> Self {
        Self {
            graph,
            address: address.into(),
            port,
        }
    }

    /// Bind the configured address and serve until the process stops
    pub async fn start(&self) -> GraphResult<()> {
        let listener = TcpListener::bind((self.address.as_str(), self.port)).await?;
        Self::serve(Arc::clone(&self.graph), listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(graph: Arc<dyn Suite>, listener: TcpListener) -> GraphResult<()> {
        let addr: SocketAddr = listener.local_addr()?;
        info!("Graph transport listening on http://{}", addr);
        axum::serve(listener, router(graph)).await?;
        Ok(())
    }
}
