#![allow(dead_code)]

use std::collections::VecDeque;

use agent_core::{tools::ToolSchema, Message};
use agent_llm::{LLMChunk, LLMError, LLMProvider, LLMStream, StreamToolCall};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub fn network_tests_disabled() -> bool {
    std::env::var_os("CODEX_SANDBOX_NETWORK_DISABLED").is_some()
}

/// One scripted provider turn; `Err` items become stream errors.
pub type Script = Vec<Result<LLMChunk, String>>;

#[derive(Default)]
pub struct MockLLMProvider {
    turns: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLLMProvider {
    pub fn new(turns: Vec<Script>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for MockLLMProvider {
    async fn chat_stream(
        &self,
        messages: &[Message],
        _tools: &[ToolSchema],
        _max_output_tokens: Option<u32>,
        _model: Option<&str>,
    ) -> agent_llm::Result<LLMStream> {
        self.requests.lock().push(messages.to_vec());
        let script = self
            .turns
            .lock()
            .pop_front()
            .ok_or_else(|| LLMError::Api("no scripted response left".to_string()))?;

        let items: Vec<agent_llm::Result<LLMChunk>> = script
            .into_iter()
            .map(|item| item.map_err(LLMError::Stream))
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

pub fn text(fragments: &[&str]) -> Script {
    fragments
        .iter()
        .map(|fragment| Ok(LLMChunk::Token(fragment.to_string())))
        .collect()
}

pub fn add_call(id: &str, a: i64, b: i64) -> Script {
    vec![
        Ok(LLMChunk::Token("Let me add those.".to_string())),
        Ok(LLMChunk::ToolCalls(vec![StreamToolCall::start(0, id, "add")])),
        Ok(LLMChunk::ToolCalls(vec![StreamToolCall::arguments(
            0,
            format!(r#"{{"a":{a},"b":{b}}}"#),
        )])),
        Ok(LLMChunk::Done),
    ]
}

struct McpResponder;

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
                "serverInfo": {"name": "calculator", "version": "1.0.0"}
            }),
            "tools/list" => json!({"tools": [{
                "name": "add",
                "description": "Add two numbers",
                "inputSchema": {
                    "type": "object",
                    "properties": {"a": {"type": "number"}, "b": {"type": "number"}}
                }
            }]}),
            "tools/call" => {
                let args = &body["params"]["arguments"];
                let sum = args["a"].as_i64().unwrap_or(0) + args["b"].as_i64().unwrap_or(0);
                json!({"content": [{"type": "text", "text": sum.to_string()}], "isError": false})
            }
            _ => json!({}),
        };

        ResponseTemplate::new(200)
            .insert_header("mcp-session-id", "calc-session")
            .set_body_json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }
}

pub async fn start_mcp_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(McpResponder)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

/// Splits a forwarded body into its text and trailing messages.
pub fn split_body(body: &[u8]) -> (String, Option<Vec<Value>>) {
    let body = String::from_utf8(body.to_vec()).expect("utf-8 body");
    match body.rfind("\n\n{") {
        Some(index) => {
            let payload: Value =
                serde_json::from_str(&body[index + 2..]).expect("trailing JSON payload");
            let messages = payload["messages"].as_array().cloned().expect("messages array");
            (body[..index].to_string(), Some(messages))
        }
        None => (body, None),
    }
}
