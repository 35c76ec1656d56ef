use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::error::MessageError;
use crate::tools::ToolCall;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A single typed part of a multi-part message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        #[serde(default)]
        args: Value,
    },
    #[serde(rename_all = "camelCase")]
    ToolResult {
        tool_call_id: String,
        tool_name: String,
        result: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn tool_call(call: ToolCall) -> Self {
        ContentPart::ToolCall {
            tool_call_id: call.tool_call_id,
            tool_name: call.tool_name,
            args: call.args,
        }
    }

    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        result: Value,
    ) -> Self {
        ContentPart::ToolResult {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            result,
            is_error: None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ContentPart::Text { .. } => "text",
            ContentPart::ToolCall { .. } => "tool-call",
            ContentPart::ToolResult { .. } => "tool-result",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    pub fn parts(&self) -> &[ContentPart] {
        match self {
            MessageContent::Text(_) => &[],
            MessageContent::Parts(parts) => parts,
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    /// Assistant turn built from streamed text plus any proposed tool calls.
    pub fn assistant(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        let text = text.into();
        let mut parts = Vec::with_capacity(tool_calls.len() + 1);
        if !text.is_empty() {
            parts.push(ContentPart::text(text));
        }
        parts.extend(tool_calls.into_iter().map(ContentPart::tool_call));
        Self::new(Role::Assistant, parts)
    }

    pub fn tool(parts: Vec<ContentPart>) -> Self {
        Self::new(Role::Tool, parts)
    }

    /// Concatenated text of the message, ignoring non-text parts.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Tool calls proposed by this message, in part order.
    pub fn tool_calls(&self) -> impl Iterator<Item = ToolCall> + '_ {
        self.content.parts().iter().filter_map(|part| match part {
            ContentPart::ToolCall {
                tool_call_id,
                tool_name,
                args,
            } => Some(ToolCall {
                tool_call_id: tool_call_id.clone(),
                tool_name: tool_name.clone(),
                args: args.clone(),
            }),
            _ => None,
        })
    }

    pub fn has_tool_calls(&self) -> bool {
        self.content
            .parts()
            .iter()
            .any(|part| matches!(part, ContentPart::ToolCall { .. }))
    }

    /// Checks that tool-call parts only appear on assistant messages and
    /// tool-result parts only on tool messages.
    pub fn validate(&self) -> Result<(), MessageError> {
        for part in self.content.parts() {
            let allowed = match part {
                ContentPart::Text { .. } => true,
                ContentPart::ToolCall { .. } => self.role == Role::Assistant,
                ContentPart::ToolResult { .. } => self.role == Role::Tool,
            };
            if !allowed {
                return Err(MessageError::PartNotAllowed {
                    role: self.role,
                    part: part.kind(),
                });
            }
        }
        Ok(())
    }
}

/// Validates every message of a history, reporting the first offending index.
pub fn validate_history(messages: &[Message]) -> Result<(), MessageError> {
    for (index, message) in messages.iter().enumerate() {
        message.validate().map_err(|source| MessageError::AtIndex {
            index,
            source: Box::new(source),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_text_content_round_trips_as_string() {
        let message: Message =
            serde_json::from_value(json!({"role": "user", "content": "What's 2+2?"})).unwrap();

        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, MessageContent::Text("What's 2+2?".into()));
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"role": "user", "content": "What's 2+2?"})
        );
    }

    #[test]
    fn tool_call_parts_use_camel_case_fields() {
        let message = Message::assistant(
            "",
            vec![ToolCall::new("c1", "add", json!({"a": 2, "b": 2}))],
        );

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "role": "assistant",
                "content": [
                    {"type": "tool-call", "toolCallId": "c1", "toolName": "add", "args": {"a": 2, "b": 2}}
                ]
            })
        );
    }

    #[test]
    fn assistant_keeps_text_before_tool_calls() {
        let message = Message::assistant("Let me add.", vec![ToolCall::new("c1", "add", json!({}))]);

        let parts = message.content.parts();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], ContentPart::text("Let me add."));
        assert!(message.has_tool_calls());
        assert_eq!(message.text(), "Let me add.");
    }

    #[test]
    fn tool_result_part_deserializes() {
        let message: Message = serde_json::from_value(json!({
            "role": "tool",
            "content": [{
                "type": "tool-result",
                "toolCallId": "c1",
                "toolName": "add",
                "result": {"error": "Tool call not approved by user"}
            }]
        }))
        .unwrap();

        assert!(message.validate().is_ok());
        match &message.content.parts()[0] {
            ContentPart::ToolResult { tool_call_id, result, .. } => {
                assert_eq!(tool_call_id, "c1");
                assert_eq!(result["error"], "Tool call not approved by user");
            }
            other => panic!("expected tool-result part, got {other:?}"),
        }
    }

    #[test]
    fn tool_calls_on_user_message_are_rejected() {
        let message = Message::new(
            Role::User,
            vec![ContentPart::tool_call(ToolCall::new("c1", "add", json!({})))],
        );

        let err = message.validate().unwrap_err();
        assert!(err.to_string().contains("tool-call"));
    }

    #[test]
    fn validate_history_reports_index() {
        let history = vec![
            Message::user("hi"),
            Message::new(
                Role::Assistant,
                vec![ContentPart::tool_result("c1", "add", json!(4))],
            ),
        ];

        let err = validate_history(&history).unwrap_err();
        assert!(matches!(err, MessageError::AtIndex { index: 1, .. }));
    }

    #[test]
    fn unknown_role_fails_to_deserialize() {
        let parsed = serde_json::from_value::<Message>(json!({"role": "robot", "content": "x"}));
        assert!(parsed.is_err());
    }
}
