use crate::models::StreamToolCall;
use crate::provider::{LLMError, Result};
use agent_core::tools::ToolCall;
use serde_json::Value;
use std::collections::HashMap;

/// Accumulates streaming tool call fragments into complete tool calls.
///
/// OpenAI-compatible providers send tool calls across multiple streaming chunks:
/// - First chunk contains metadata (id, type, function name)
/// - Subsequent chunks contain only argument fragments
///
/// This accumulator collects all fragments by index and converts them into complete
/// [`ToolCall`] objects with parsed arguments when the stream finishes.
#[derive(Debug, Default)]
pub struct StreamToolAccumulator {
    /// Maps tool call index to accumulated data
    tool_calls: HashMap<u32, AccumulatedToolCall>,
}

#[derive(Debug, Clone, Default)]
struct AccumulatedToolCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl StreamToolAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the fragments of one streaming chunk into the accumulated state.
    pub fn process_chunk(&mut self, stream_calls: &[StreamToolCall]) {
        for call in stream_calls {
            let entry = self.tool_calls.entry(call.index).or_default();

            if let Some(id) = &call.id {
                entry.id = Some(id.clone());
            }
            if let Some(function) = &call.function {
                if let Some(name) = &function.name {
                    entry.name = Some(name.clone());
                }
                if let Some(args) = &function.arguments {
                    entry.arguments.push_str(args);
                }
            }
        }
    }

    /// Convert accumulated data into [`ToolCall`] objects, sorted by index.
    ///
    /// Fragments that never received an id or name are dropped. Empty arguments
    /// become `{}`; arguments that are not valid JSON fail the whole batch.
    pub fn into_tool_calls(self) -> Result<Vec<ToolCall>> {
        let mut calls: Vec<_> = self.tool_calls.into_iter().collect();
        calls.sort_by_key(|(index, _)| *index);

        calls
            .into_iter()
            .filter_map(|(_, acc)| Some((acc.id?, acc.name?, acc.arguments)))
            .map(|(id, name, arguments)| {
                let args = if arguments.trim().is_empty() {
                    Value::Object(Default::default())
                } else {
                    serde_json::from_str(&arguments).map_err(|e| {
                        LLMError::InvalidToolArguments {
                            tool_name: name.clone(),
                            message: e.to_string(),
                        }
                    })?
                };
                Ok(ToolCall::new(id, name, args))
            })
            .collect()
    }
}
