//! JSON-over-HTTP transport
//!
//! - `rpc`: method names and request bodies
//! - `handler` / `server`: expose any suite with axum
//! - `client`: `RemoteGraph`, a suite backed by a remote server

pub mod client;
pub mod handler;
pub mod rpc;
pub mod server;

pub use client::RemoteGraph;
pub use handler::ApiError;
pub use server::{router, HttpServer};
