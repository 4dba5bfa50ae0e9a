//! `sqlchat serve`: run the HTTP service.

use anyhow::{anyhow, Result};
use std::sync::Arc;

use crate::adapters::http::{HttpServerConfig, SqlChatHttpServer};
use crate::adapters::llm::ProviderRegistry;
use crate::cli::types::ServeArgs;
use crate::domain::models::Config;
use crate::services::AgentFactory;

/// Run the HTTP service until Ctrl-C.
pub async fn execute(args: ServeArgs, config: Config) -> Result<()> {
    let factory = AgentFactory::new(
        Arc::new(ProviderRegistry::new(config.llm.clone())),
        config.agent.clone(),
    );

    let mut server_config = HttpServerConfig::from(&config);
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }
    server_config.verbose = args.verbose;

    SqlChatHttpServer::new(factory, server_config)
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("HTTP server failed: {e}"))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
