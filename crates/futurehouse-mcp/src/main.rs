//! FutureHouse MCP Server

use std::sync::Arc;

use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use futurehouse_client::HttpJobClient;
use futurehouse_mcp::{
    create_mcp_router, Cli, Config, Dispatcher, FutureHouseMcpServer, Transport,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("futurehouse=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let config = Config::from_cli(cli)?;

    let client = HttpJobClient::new(&config.base_url, config.api_key.clone())?;
    let dispatcher = Dispatcher::new(Arc::new(client), config.poll);

    let server = if config.phoenix_only {
        FutureHouseMcpServer::phoenix_only(dispatcher, &config.api_key)
    } else {
        FutureHouseMcpServer::new(dispatcher, &config.api_key)
    };

    info!(
        base_url = %config.base_url,
        transport = ?config.transport,
        phoenix_only = config.phoenix_only,
        "Starting FutureHouse MCP server"
    );

    match config.transport {
        Transport::Stdio => {
            let service = server.serve(stdio()).await?;
            service.waiting().await?;
        }
        Transport::StreamableHttp => {
            let ct = CancellationToken::new();
            let router = create_mcp_router(server, ct.clone()).layer(TraceLayer::new_for_http());

            let addr = config.bind_addr();
            let listener = TcpListener::bind(&addr).await?;
            info!("MCP server listening on http://{}/mcp", addr);

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    tokio::signal::ctrl_c().await.ok();
                    ct.cancel();
                })
                .await?;
        }
    }

    info!("FutureHouse MCP server stopped");

    Ok(())
}
