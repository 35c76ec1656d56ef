use std::collections::HashSet;

use serde_json::{json, Value};

use agent_core::tools::{ToolCall, ToolExecutionContext, ToolSet};
use agent_core::{validate_history, ContentPart, Message, Role};
use agent_mcp::{McpServerConfig, ToolDirectory};

use crate::error::{Result, TurnError};

pub const REJECTION_MESSAGE: &str = "Tool call not approved by user";

/// Result recorded for a proposal the user did not approve.
pub fn rejection_marker() -> Value {
    json!({ "error": REJECTION_MESSAGE })
}

/// Every tool call proposed by assistant messages in `messages`, flattened in
/// encounter order.
pub fn proposed_tool_calls(messages: &[Message]) -> Vec<ToolCall> {
    messages
        .iter()
        .filter(|message| message.role == Role::Assistant)
        .flat_map(Message::tool_calls)
        .collect()
}

/// Resolves every proposal in `messages` against the user's approvals,
/// executing approved calls on a fresh connection to the tool server.
///
/// Returns one tool message per proposal, in proposal order.
pub async fn resolve_tool_calls(
    messages: &[Message],
    server_config: &McpServerConfig,
    approved_ids: &HashSet<String>,
) -> Result<Vec<Message>> {
    validate_history(messages)?;

    let directory = ToolDirectory::open(server_config).await?;
    let resolved = resolve_with_tools(messages, directory.tools(), approved_ids).await;

    if let Err(e) = directory.close().await {
        log::warn!("Failed to close tool directory after approvals: {}", e);
    }

    resolved
}

/// Resolves proposals against an already fetched tool set.
///
/// Calls run one at a time. The first unknown tool or execution failure
/// aborts the batch.
pub async fn resolve_with_tools(
    messages: &[Message],
    tools: &ToolSet,
    approved_ids: &HashSet<String>,
) -> Result<Vec<Message>> {
    let proposals = proposed_tool_calls(messages);

    let proposed_ids: HashSet<&str> = proposals
        .iter()
        .map(|call| call.tool_call_id.as_str())
        .collect();
    for id in approved_ids {
        if !proposed_ids.contains(id.as_str()) {
            log::debug!("Ignoring approval for unknown tool call {}", id);
        }
    }

    let mut results = Vec::with_capacity(proposals.len());
    for call in proposals {
        let result = if approved_ids.contains(&call.tool_call_id) {
            execute_approved(&call, tools, messages).await?
        } else {
            log::info!("Tool call {} ({}) rejected", call.tool_call_id, call.tool_name);
            rejection_marker()
        };

        results.push(Message::tool(vec![ContentPart::tool_result(
            call.tool_call_id,
            call.tool_name,
            result,
        )]));
    }

    Ok(results)
}

async fn execute_approved(call: &ToolCall, tools: &ToolSet, messages: &[Message]) -> Result<Value> {
    let executor = tools
        .get(&call.tool_name)
        .and_then(|tool| tool.execute.clone())
        .ok_or_else(|| TurnError::UnknownTool {
            tool_call_id: call.tool_call_id.clone(),
            tool_name: call.tool_name.clone(),
        })?;

    log::info!("Executing approved tool call {} ({})", call.tool_call_id, call.tool_name);
    let context = ToolExecutionContext {
        tool_call_id: &call.tool_call_id,
        messages,
    };

    executor
        .execute(call.args.clone(), context)
        .await
        .map_err(|source| TurnError::ToolExecution {
            tool_call_id: call.tool_call_id.clone(),
            tool_name: call.tool_name.clone(),
            source,
        })
}
