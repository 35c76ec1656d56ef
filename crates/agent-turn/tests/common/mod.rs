#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agent_core::{tools::ToolSchema, Message};
use agent_llm::{LLMChunk, LLMError, LLMProvider, LLMStream, StreamToolCall};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const SESSION_ID: &str = "test-session";

pub fn network_tests_disabled() -> bool {
    std::env::var_os("CODEX_SANDBOX_NETWORK_DISABLED").is_some()
}

/// Mock LLM provider replaying one scripted chunk list per call.
#[derive(Default)]
pub struct MockLLMProvider {
    turns: Mutex<VecDeque<Vec<LLMChunk>>>,
    requests: Mutex<Vec<(Vec<Message>, Vec<ToolSchema>)>>,
    chunk_delay: Option<Duration>,
    finished: Arc<AtomicBool>,
}

impl MockLLMProvider {
    pub fn new(turns: Vec<Vec<LLMChunk>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            ..Default::default()
        }
    }

    pub fn with_text_response(text: &str) -> Self {
        Self::new(vec![text
            .split_inclusive(' ')
            .map(|word| LLMChunk::Token(word.to_string()))
            .collect()])
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    /// Set once the last scripted chunk of a turn has been produced.
    pub fn finished(&self) -> Arc<AtomicBool> {
        self.finished.clone()
    }

    pub fn requests(&self) -> Vec<(Vec<Message>, Vec<ToolSchema>)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for MockLLMProvider {
    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        _max_output_tokens: Option<u32>,
        _model: Option<&str>,
    ) -> agent_llm::Result<LLMStream> {
        self.requests.lock().push((messages.to_vec(), tools.to_vec()));
        let chunks = self
            .turns
            .lock()
            .pop_front()
            .ok_or_else(|| LLMError::Api("no scripted response left".to_string()))?;
        let delay = self.chunk_delay;
        let finished = self.finished.clone();

        Ok(Box::pin(async_stream::stream! {
            for chunk in chunks {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(chunk);
            }
            finished.store(true, Ordering::SeqCst);
        }))
    }
}

/// Chunks proposing a single tool call, split the way OpenAI streams them.
pub fn tool_call_chunks(text: &str, id: &str, name: &str, args: &str) -> Vec<LLMChunk> {
    let (head, tail) = args.split_at(args.len() / 2);
    vec![
        LLMChunk::Token(text.to_string()),
        LLMChunk::ToolCalls(vec![StreamToolCall::start(0, id, name)]),
        LLMChunk::ToolCalls(vec![StreamToolCall::arguments(0, head)]),
        LLMChunk::ToolCalls(vec![StreamToolCall::arguments(0, tail)]),
        LLMChunk::Done,
    ]
}

pub fn add_tool() -> Value {
    json!({
        "name": "add",
        "description": "Add two numbers",
        "inputSchema": {
            "type": "object",
            "properties": {"a": {"type": "number"}, "b": {"type": "number"}},
            "required": ["a", "b"]
        }
    })
}

/// Streamable HTTP MCP server answering JSON-RPC requests with the same id.
pub struct McpResponder {
    tools: Vec<Value>,
}

impl Respond for McpResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let Some(id) = body.get("id").cloned() else {
            return ResponseTemplate::new(202);
        };

        let result = match body["method"].as_str().unwrap_or_default() {
            "initialize" => json!({
                "protocolVersion": "2025-03-26",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "test-tools", "version": "1.0.0"}
            }),
            "tools/list" => json!({ "tools": self.tools }),
            "tools/call" => {
                let args = &body["params"]["arguments"];
                let sum = args["a"].as_f64().unwrap_or(0.0) + args["b"].as_f64().unwrap_or(0.0);
                json!({
                    "content": [{"type": "text", "text": sum.to_string()}],
                    "isError": false
                })
            }
            other => {
                return ResponseTemplate::new(200).set_body_json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32601, "message": format!("Method not found: {other}")}
                }))
            }
        };

        ResponseTemplate::new(200)
            .insert_header("mcp-session-id", SESSION_ID)
            .set_body_json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }
}

pub async fn start_mcp_server(tools: Vec<Value>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(McpResponder { tools })
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

pub async fn requests_with_method(server: &MockServer, rpc_method: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| {
            serde_json::from_slice::<Value>(&request.body)
                .map(|body| body["method"] == rpc_method)
                .unwrap_or(false)
        })
        .count()
}

pub async fn session_deletes(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.to_string() == "DELETE")
        .count()
}
