//! Relays a completion to the HTTP response body.
//!
//! Body layout: the text fragments as they arrive, then [`PAYLOAD_DELIMITER`],
//! then one JSON object `{"messages": [...]}`. Once headers are sent there is
//! no way to report a failure, so any error ends the body early without the
//! trailing payload.

use actix_web::http::header;
use actix_web::web::Bytes;
use actix_web::HttpResponse;
use agent_core::Message;
use agent_turn::CompletionStream;
use futures::{Stream, StreamExt};
use serde::Serialize;

pub const PAYLOAD_DELIMITER: &str = "\n\n";

#[derive(Serialize)]
struct TrailingPayload<'a> {
    messages: &'a [Message],
}

/// Delimiter plus serialized `{"messages": prefix ++ finalized}`.
pub fn trailing_payload(
    mut prefix: Vec<Message>,
    finalized: Vec<Message>,
) -> serde_json::Result<Bytes> {
    prefix.extend(finalized);
    let json = serde_json::to_string(&TrailingPayload { messages: &prefix })?;

    let mut payload = String::with_capacity(PAYLOAD_DELIMITER.len() + json.len());
    payload.push_str(PAYLOAD_DELIMITER);
    payload.push_str(&json);
    Ok(Bytes::from(payload))
}

pub fn forward_completion(
    mut completion: CompletionStream,
    prefix: Vec<Message>,
) -> impl Stream<Item = Result<Bytes, actix_web::Error>> {
    async_stream::stream! {
        let mut fragments = 0usize;

        while let Some(fragment) = completion.next().await {
            match fragment {
                Ok(text) => {
                    fragments += 1;
                    yield Ok::<_, actix_web::Error>(Bytes::from(text));
                }
                Err(e) => {
                    log::error!("Completion failed after {} fragments: {}", fragments, e);
                    return;
                }
            }
        }

        let Some(finalized) = completion.take_messages() else {
            log::error!("Completion ended without finalized messages");
            return;
        };

        match trailing_payload(prefix, finalized) {
            Ok(payload) => {
                log::debug!("Forwarded {} fragments and trailing payload", fragments);
                yield Ok(payload);
            }
            Err(e) => log::error!("Failed to serialize trailing messages: {}", e),
        }
    }
}

/// Streaming response for a completion; the body always terminates.
pub fn completion_response(completion: CompletionStream, prefix: Vec<Message>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(forward_completion(completion, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tools::ToolCall;
    use agent_core::ContentPart;
    use serde_json::{json, Value};

    #[test]
    fn payload_starts_with_delimiter_and_keeps_prefix_first() {
        let prefix = vec![Message::tool(vec![ContentPart::tool_result(
            "c1",
            "add",
            json!({"error": "Tool call not approved by user"}),
        )])];
        let finalized = vec![Message::assistant("Okay, I won't add them.", vec![])];

        let payload = trailing_payload(prefix, finalized).unwrap();
        let text = std::str::from_utf8(&payload).unwrap();

        assert!(text.starts_with("\n\n{"));
        let json: Value = serde_json::from_str(&text[PAYLOAD_DELIMITER.len()..]).unwrap();
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "tool");
        assert_eq!(messages[0]["content"][0]["type"], "tool-result");
        assert_eq!(messages[0]["content"][0]["toolCallId"], "c1");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[test]
    fn payload_serializes_tool_calls_in_wire_shape() {
        let finalized = vec![Message::assistant(
            "",
            vec![ToolCall::new("c1", "add", json!({"a": 2, "b": 2}))],
        )];

        let payload = trailing_payload(vec![Message::user("What's 2+2?")], finalized).unwrap();
        let json: Value = serde_json::from_slice(&payload[PAYLOAD_DELIMITER.len()..]).unwrap();

        assert_eq!(json["messages"][0], json!({"role": "user", "content": "What's 2+2?"}));
        assert_eq!(
            json["messages"][1]["content"],
            json!([{"type": "tool-call", "toolCallId": "c1", "toolName": "add", "args": {"a": 2, "b": 2}}])
        );
    }
}
