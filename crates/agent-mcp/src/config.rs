use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

use crate::error::{McpError, Result};

/// Connection parameters for a streamable HTTP MCP server, supplied by the
/// caller per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// MCP endpoint URL
    pub url: String,
    /// Additional headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl McpServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Parses the endpoint, accepting only absolute http(s) URLs.
    pub fn endpoint(&self) -> Result<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| McpError::InvalidConfig(format!("Invalid URL '{}': {}", self.url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(McpError::InvalidConfig(format!(
                "Unsupported URL scheme '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_default_to_empty() {
        let config: McpServerConfig =
            serde_json::from_str(r#"{"url": "http://localhost:3040/mcp"}"#).unwrap();

        assert!(config.headers.is_empty());
        assert_eq!(config.endpoint().unwrap().path(), "/mcp");
    }

    #[test]
    fn endpoint_rejects_relative_and_non_http_urls() {
        assert!(matches!(
            McpServerConfig::new("/mcp").endpoint(),
            Err(McpError::InvalidConfig(_))
        ));
        assert!(matches!(
            McpServerConfig::new("ftp://example.com/mcp").endpoint(),
            Err(McpError::InvalidConfig(_))
        ));
    }

    #[test]
    fn with_header_accumulates() {
        let config = McpServerConfig::new("https://tools.example.com/mcp")
            .with_header("Authorization", "Bearer abc")
            .with_header("X-Trace", "1");

        assert_eq!(config.headers.len(), 2);
        assert_eq!(config.headers["Authorization"], "Bearer abc");
    }
}
