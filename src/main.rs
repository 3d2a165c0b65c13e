use anyhow::Context;
use graphsuite::{HttpServer, ServerConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "graphsuite.yaml".to_string());
    let config = ServerConfig::load(&path)
        .with_context(|| format!("loading configuration from {}", path))?;

    info!("graphsuite v{}", graphsuite::version());
    let dispatcher = config
        .build_dispatcher()
        .await
        .context("building suites")?;
    for name in dispatcher.suite_names() {
        info!("Suite ready: {}", name);
    }

    let server = HttpServer::new(Arc::new(dispatcher), config.address.clone(), config.port);
    server.start().await.context("serving")?;
    Ok(())
}
