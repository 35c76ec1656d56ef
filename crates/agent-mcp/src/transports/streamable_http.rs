use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::McpServerConfig;
use crate::error::{McpError, Result};
use crate::protocol::client::McpTransport;
use crate::protocol::models::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

pub const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";
pub const MCP_PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";
const ACCEPT_JSON_AND_SSE: &str = "application/json, text/event-stream";

/// Streamable HTTP transport: every message is a POST to the endpoint and the
/// server answers with either a JSON body or an SSE stream.
pub struct StreamableHttpTransport {
    client: Client,
    endpoint: Url,
    headers: HeaderMap,
    session_id: Mutex<Option<String>>,
    protocol_version: Mutex<Option<String>>,
    closed: AtomicBool,
}

impl StreamableHttpTransport {
    pub fn new(config: &McpServerConfig) -> Result<Self> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &McpServerConfig) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: config.endpoint()?,
            headers: build_headers(config)?,
            session_id: Mutex::new(None),
            protocol_version: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().clone()
    }

    fn request_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        if let Some(session_id) = self.session_id.lock().as_deref() {
            if let Ok(value) = HeaderValue::from_str(session_id) {
                headers.insert(MCP_SESSION_ID_HEADER, value);
            }
        }
        if let Some(version) = self.protocol_version.lock().as_deref() {
            if let Ok(value) = HeaderValue::from_str(version) {
                headers.insert(MCP_PROTOCOL_VERSION_HEADER, value);
            }
        }
        headers
    }

    async fn post(&self, body: String) -> Result<Response> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(McpError::Disconnected);
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.request_headers())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_JSON_AND_SSE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Connection(format!("HTTP {}: {}", status, body)));
        }

        if let Some(session_id) = response
            .headers()
            .get(MCP_SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            let mut current = self.session_id.lock();
            if current.as_deref() != Some(session_id) {
                debug!("MCP session established: {}", session_id);
                *current = Some(session_id.to_string());
            }
        }

        Ok(response)
    }
}

#[async_trait]
impl McpTransport for StreamableHttpTransport {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse> {
        let id = request.id;
        let response = self.post(serde_json::to_string(&request)?).await?;

        if is_event_stream(&response) {
            read_sse_response(response, id).await
        } else {
            let body = response.bytes().await?;
            serde_json::from_slice::<JsonRpcResponse>(&body).map_err(|e| {
                McpError::Protocol(format!("Malformed JSON-RPC response: {}", e))
            })
        }
    }

    async fn notify(&self, notification: JsonRpcNotification) -> Result<()> {
        self.post(serde_json::to_string(&notification)?).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let session_id = self.session_id.lock().take();
        let Some(session_id) = session_id else {
            return Ok(());
        };

        info!("Closing MCP session {}", session_id);
        terminate_session(&self.client, self.endpoint.clone(), self.headers.clone(), session_id)
            .await
    }

    fn set_protocol_version(&self, version: &str) {
        *self.protocol_version.lock() = Some(version.to_string());
    }
}

impl Drop for StreamableHttpTransport {
    fn drop(&mut self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let Some(session_id) = self.session_id.get_mut().take() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("MCP session {} dropped outside a runtime; not terminated", session_id);
            return;
        };

        debug!("MCP session {} dropped without close; terminating", session_id);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let headers = self.headers.clone();
        handle.spawn(async move {
            if let Err(e) = terminate_session(&client, endpoint, headers, session_id).await {
                warn!("Failed to terminate dropped MCP session: {}", e);
            }
        });
    }
}

fn build_headers(config: &McpServerConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| McpError::InvalidConfig(format!("Invalid header name: {}", e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| McpError::InvalidConfig(format!("Invalid header value: {}", e)))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

fn is_event_stream(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().starts_with("text/event-stream"))
        .unwrap_or(false)
}

/// Reads SSE events until the response for `id` arrives. Notifications and
/// server-initiated requests on the same stream are skipped.
async fn read_sse_response(response: Response, id: u64) -> Result<JsonRpcResponse> {
    let mut stream = response.bytes_stream().eventsource();

    while let Some(event) = stream.next().await {
        let event = event.map_err(|e| McpError::Transport(e.to_string()))?;
        if event.data.trim().is_empty() {
            continue;
        }

        let message: Value = match serde_json::from_str(&event.data) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping malformed SSE message: {}", e);
                continue;
            }
        };
        if message.get("method").is_some() {
            debug!("Skipping server message on response stream: {}", message["method"]);
            continue;
        }

        let response: JsonRpcResponse = serde_json::from_value(message).map_err(|e| {
            McpError::Protocol(format!("Malformed JSON-RPC response: {}", e))
        })?;
        if response.id == id {
            return Ok(response);
        }
        debug!("Skipping response for request {}", response.id);
    }

    Err(McpError::Protocol(format!(
        "Response stream ended before request {} was answered",
        id
    )))
}

async fn terminate_session(
    client: &Client,
    endpoint: Url,
    headers: HeaderMap,
    session_id: String,
) -> Result<()> {
    let response = client
        .delete(endpoint)
        .headers(headers)
        .header(MCP_SESSION_ID_HEADER, session_id)
        .send()
        .await?;

    let status = response.status();
    // servers may refuse client-initiated termination
    if status.is_success() || status == StatusCode::METHOD_NOT_ALLOWED {
        Ok(())
    } else {
        Err(McpError::Transport(format!("DELETE failed: {}", status)))
    }
}
