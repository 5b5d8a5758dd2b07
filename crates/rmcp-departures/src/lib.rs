//! rmcp-departures: MCP server for real-time train departures from a single
//! Île-de-France station, filtered to one destination.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::*,
    transport::streamable_http_server::{session::local::LocalSessionManager, StreamableHttpService},
    ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub mod config;
pub mod departure;
pub mod error;
pub mod predictor;
pub mod siri;

pub use config::{Config, ConfigError, MonitoringRequest, Transport};
pub use predictor::DeparturePredictor;

/// Path the streamable HTTP transport is mounted on.
pub const MCP_HTTP_PATH: &str = "/mcp";

#[derive(Debug)]
pub struct DepartureServer {
    pub tool_router: ToolRouter<Self>,
    predictor: DeparturePredictor,
    request: MonitoringRequest,
}

impl DepartureServer {
    pub fn new(config: Config) -> Self {
        Self {
            tool_router: Self::tool_router(),
            predictor: DeparturePredictor::new(&config),
            request: config.request,
        }
    }
}

// Tool parameter structs
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct NextTrainsParams {
    #[schemars(description = "Ignored; the server always queries its configured stop-monitoring endpoint")]
    #[serde(default)]
    pub monitoring_url: String,
    #[schemars(description = "Ignored; the server always uses its configured API key")]
    #[serde(default)]
    pub api_key_env: String,
}

#[rmcp::tool_router]
impl DepartureServer {
    #[rmcp::tool(
        description = "Get the next train departures from Les Vallées to Saint Lazare as local HH:MM times. Takes no required arguments."
    )]
    pub async fn next_trains_to_saint_lazare(
        &self,
        Parameters(params): Parameters<NextTrainsParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Tool called: next_trains_to_saint_lazare");

        // Callers (LLMs) tend to invent endpoints and keys; only process
        // configuration is trusted.
        let url = params.monitoring_url.trim();
        if !url.is_empty() {
            warn!(monitoring_url = %url, "Ignoring caller-supplied monitoring_url, using configured endpoint");
        }
        if !params.api_key_env.trim().is_empty() {
            warn!("Ignoring caller-supplied api_key_env, using configured key");
        }

        let report = self.predictor.get_next_departures(&self.request).await;
        Ok(CallToolResult::success(vec![Content::text(report)]))
    }
}

/// Router serving `DepartureServer` over streamable HTTP at [`MCP_HTTP_PATH`],
/// one server instance per MCP session.
pub fn http_router(config: Config) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(DepartureServer::new(config.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    axum::Router::new().nest_service(MCP_HTTP_PATH, service)
}

#[rmcp::tool_handler]
impl ServerHandler for DepartureServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Île-de-France Mobilités stop monitoring. Call next_trains_to_saint_lazare \
                 without arguments to list upcoming departures."
                    .into(),
            ),
        }
    }
}
