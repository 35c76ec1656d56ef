use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::executor::ToolExecutor;

/// A model-proposed invocation awaiting approval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub tool_call_id: String,
    pub tool_name: String,
    pub args: Value,
}

impl ToolCall {
    pub fn new(tool_call_id: impl Into<String>, tool_name: impl Into<String>, args: Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args,
        }
    }
}

/// Schema-only view of a tool, in the OpenAI `tools` array shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub function: FunctionSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool fetched from a tool server. `execute` is bound to the connection
/// the definition was fetched over and is absent on schema-only copies.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    #[serde(skip)]
    pub execute: Option<Arc<dyn ToolExecutor>>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            execute: None,
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn ToolExecutor>) -> Self {
        self.execute = Some(executor);
        self
    }

    pub fn is_executable(&self) -> bool {
        self.execute.is_some()
    }

    pub fn without_execute(&self) -> Self {
        Self {
            execute: None,
            ..self.clone()
        }
    }

    pub fn schema(&self) -> ToolSchema {
        ToolSchema {
            schema_type: "function".to_string(),
            function: FunctionSchema {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: self.input_schema.clone(),
            },
        }
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .field("executable", &self.is_executable())
            .finish()
    }
}

/// Tool catalog keyed by tool name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ToolSet {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition; a later definition with the same name replaces
    /// the earlier one.
    pub fn insert(&mut self, tool: ToolDefinition) {
        self.tools.insert(tool.name.clone(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    /// Copy of the set with every execute capability removed, so tools can
    /// be advertised for selection but never invoked.
    pub fn without_execute(&self) -> Self {
        self.iter().map(ToolDefinition::without_execute).collect()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.iter().map(ToolDefinition::schema).collect()
    }
}

impl FromIterator<ToolDefinition> for ToolSet {
    fn from_iter<I: IntoIterator<Item = ToolDefinition>>(iter: I) -> Self {
        let mut set = ToolSet::new();
        for tool in iter {
            set.insert(tool);
        }
        set
    }
}
