use std::collections::HashSet;

use actix_web::{web, HttpResponse};
use agent_core::Message;
use agent_mcp::McpServerConfig;
use agent_turn::{resolve_tool_calls, stream_completion};
use serde::Deserialize;

use crate::error::Result;
use crate::forwarder::completion_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallApprovalRequest {
    pub messages: Vec<Message>,
    pub server_config: McpServerConfig,
    pub approved_tool_call_ids: Vec<String>,
}

/// Resolves the proposed tool calls in `messages` and streams the model's
/// continuation. The trailing payload holds the tool-result messages
/// followed by the new assistant messages.
pub async fn handler(
    state: web::Data<AppState>,
    req: web::Json<ToolCallApprovalRequest>,
) -> Result<HttpResponse> {
    let ToolCallApprovalRequest {
        messages,
        server_config,
        approved_tool_call_ids,
    } = req.into_inner();
    let approved: HashSet<String> = approved_tool_call_ids.into_iter().collect();
    log::info!(
        "Tool call approvals: {} approved ids over {} messages",
        approved.len(),
        messages.len()
    );

    let tool_messages = resolve_tool_calls(&messages, &server_config, &approved)
        .await
        .map_err(|e| {
            log::error!("Failed to resolve tool calls: {}", e);
            e
        })?;

    let mut history = messages;
    history.extend(tool_messages.iter().cloned());

    let completion = stream_completion(state.llm.clone(), &history, &server_config)
        .await
        .map_err(|e| {
            log::error!("Failed to start continuation after approvals: {}", e);
            e
        })?;

    Ok(completion_response(completion, tool_messages))
}
