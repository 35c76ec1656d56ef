use actix_web::{web, HttpResponse};
use agent_core::Message;
use agent_mcp::McpServerConfig;
use agent_turn::stream_completion;
use serde::Deserialize;

use crate::error::Result;
use crate::forwarder::completion_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub server_config: McpServerConfig,
}

/// Streams the next assistant turn. The trailing payload repeats the request
/// history followed by the new messages.
pub async fn handler(
    state: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse> {
    let ChatRequest {
        messages,
        server_config,
    } = req.into_inner();
    log::info!(
        "Chat request with {} messages, tool server {}",
        messages.len(),
        server_config.url
    );

    let completion = stream_completion(state.llm.clone(), &messages, &server_config)
        .await
        .map_err(|e| {
            log::error!("Failed to start chat completion: {}", e);
            e
        })?;

    Ok(completion_response(completion, messages))
}
