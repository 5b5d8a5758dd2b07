//! idf-departures - next trains from one Île-de-France station, over MCP
//!
//! Run with: `idf-departures` (serves on stdio, or streamable HTTP at `/mcp`
//! with `IDF_TRANSPORT=http`). Configured through `IDF_*` environment
//! variables, optionally from a `.env` file.

use rmcp::ServiceExt;
use rmcp_departures::{http_router, Config, DepartureServer, Transport, MCP_HTTP_PATH};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    // Initialize tracing (to stderr so it doesn't interfere with stdio transport)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    let config = Config::from_env()?;

    tracing::info!(
        endpoint = %config.request.endpoint,
        destination_ref = %config.request.destination_ref,
        timezone = %config.timezone,
        "Starting idf-departures server"
    );

    match config.transport {
        Transport::Stdio => {
            let server = DepartureServer::new(config);
            let service = server.serve(rmcp::transport::stdio()).await?;

            // Wait for shutdown
            service.waiting().await?;
        }
        Transport::Http => {
            let bind_socket = config.bind_socket;
            let app = http_router(config);
            let listener = tokio::net::TcpListener::bind(bind_socket).await?;

            tracing::info!(%bind_socket, path = MCP_HTTP_PATH, "Serving MCP over streamable HTTP");

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
        }
    }

    tracing::info!("idf-departures server stopped");
    Ok(())
}
