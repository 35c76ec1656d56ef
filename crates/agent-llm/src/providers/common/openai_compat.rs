//! OpenAI-compatible request serialization helpers.
//!
//! Conversation history arrives as multi-part messages (text, tool-call and
//! tool-result parts). The chat completions API wants a flat list where tool
//! calls hang off the assistant message and every tool result is its own
//! `role: "tool"` message, so the conversion is not one-to-one.

use agent_core::{tools::ToolSchema, ContentPart, Message, MessageContent, Role};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::StreamToolCall;
use crate::provider::Result;
use crate::types::LLMChunk;

/// Convert conversation [`Message`] values to an OpenAI-compatible JSON array.
pub fn messages_to_openai_compat_json(messages: &[Message]) -> Vec<Value> {
    let mut out = Vec::with_capacity(messages.len());

    for message in messages {
        match message.role {
            Role::System | Role::User => {
                out.push(json!({
                    "role": message.role.to_string(),
                    "content": message.text(),
                }));
            }
            Role::Assistant => {
                let text = message.text();
                let tool_calls: Vec<Value> = message
                    .tool_calls()
                    .map(|call| {
                        json!({
                            "id": call.tool_call_id,
                            "type": "function",
                            "function": {
                                "name": call.tool_name,
                                "arguments": arguments_string(&call.args),
                            },
                        })
                    })
                    .collect();

                let mut msg = json!({ "role": "assistant" });
                if tool_calls.is_empty() {
                    msg["content"] = json!(text);
                } else {
                    msg["content"] = if text.is_empty() { Value::Null } else { json!(text) };
                    msg["tool_calls"] = json!(tool_calls);
                }
                out.push(msg);
            }
            Role::Tool => match &message.content {
                MessageContent::Text(text) => {
                    // Without parts there is no call id to answer; pass through as user text.
                    out.push(json!({ "role": "user", "content": text }));
                }
                MessageContent::Parts(parts) => {
                    for part in parts {
                        if let ContentPart::ToolResult {
                            tool_call_id,
                            result,
                            ..
                        } = part
                        {
                            out.push(json!({
                                "role": "tool",
                                "tool_call_id": tool_call_id,
                                "content": result_content(result),
                            }));
                        }
                    }
                }
            },
        }
    }

    out
}

fn arguments_string(args: &Value) -> String {
    match args {
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    }
}

fn result_content(result: &Value) -> String {
    match result {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Convert [`ToolSchema`] values to the OpenAI `tools` array JSON.
pub fn tools_to_openai_compat_json(tools: &[ToolSchema]) -> Vec<Value> {
    tools.iter().map(|t| json!(t)).collect()
}

/// Build a standard OpenAI-compatible streaming chat request body.
///
/// `tools` is omitted entirely when empty; some compatible servers reject an
/// empty array.
pub fn build_openai_compat_body(
    model: &str,
    messages: &[Message],
    tools: &[ToolSchema],
    tool_choice: Option<Value>,
    max_output_tokens: Option<u32>,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages_to_openai_compat_json(messages),
        "stream": true,
    });

    if !tools.is_empty() {
        body["tools"] = json!(tools_to_openai_compat_json(tools));
    }

    if let Some(tool_choice) = tool_choice {
        body["tool_choice"] = tool_choice;
    }

    if let Some(max_tokens) = max_output_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    body
}

// --- OpenAI-compatible streaming chunk parsing ---

#[derive(Debug, Deserialize)]
pub struct OpenAICompatStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAICompatChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatChoice {
    #[serde(default)]
    delta: OpenAICompatDelta,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAICompatDelta {
    content: Option<String>,
    tool_calls: Option<Vec<StreamToolCall>>,
}

/// Convert a single OpenAI-compatible stream chunk into [`LLMChunk`]s.
///
/// A delta may carry text and tool-call fragments at once; the text comes
/// first. Deltas with neither yield nothing.
pub fn parse_openai_compat_chunk(chunk: OpenAICompatStreamChunk) -> Vec<LLMChunk> {
    let Some(choice) = chunk.choices.into_iter().next() else {
        return Vec::new();
    };

    let mut chunks = Vec::new();
    if let Some(content) = choice.delta.content.filter(|content| !content.is_empty()) {
        chunks.push(LLMChunk::Token(content));
    }
    if let Some(tool_calls) = choice.delta.tool_calls.filter(|calls| !calls.is_empty()) {
        chunks.push(LLMChunk::ToolCalls(tool_calls));
    }
    chunks
}

/// Parse an SSE `data:` payload.
///
/// - `"[DONE]"` -> `[LLMChunk::Done]`
/// - Invalid JSON -> error
pub fn parse_openai_compat_sse_data_strict(data: &str) -> Result<Vec<LLMChunk>> {
    if data.trim() == "[DONE]" {
        return Ok(vec![LLMChunk::Done]);
    }

    let chunk: OpenAICompatStreamChunk = serde_json::from_str(data)?;
    Ok(parse_openai_compat_chunk(chunk))
}
