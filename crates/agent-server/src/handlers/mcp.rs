use actix_web::{web, HttpResponse};
use agent_mcp::{fetch_tool_catalog, McpServerConfig};

use crate::error::Result;

/// Lists the tools of the MCP server described by the request body, keyed by
/// tool name. Execution handles are never exposed.
pub async fn list_tools(req: web::Json<McpServerConfig>) -> Result<HttpResponse> {
    let config = req.into_inner();
    log::info!("Listing tools of {}", config.url);

    let catalog = fetch_tool_catalog(&config).await.map_err(|e| {
        log::error!("Failed to list tools of {}: {}", config.url, e);
        e
    })?;

    Ok(HttpResponse::Ok().json(&catalog))
}
