use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A struct to represent the result of tool operations
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub is_error: bool,
    pub content: ToolContent,
}

impl ToolResult {
    pub fn ok(content: impl Into<ToolContent>) -> Self {
        ToolResult {
            is_error: false,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<ToolContent>) -> Self {
        ToolResult {
            is_error: true,
            content: content.into(),
        }
    }

    /// Text handed back to the model. Errors reported by the tool itself are
    /// prefixed so the model can tell them apart from regular output.
    pub fn to_message_text(&self) -> String {
        match self.is_error {
            true => format!("Error: {}", self.content),
            false => self.content.to_string(),
        }
    }
}

/// Represents either a single string or an array of strings
#[derive(Debug, Clone, PartialEq)]
pub enum ToolContent {
    String(String),
    StringArray(Vec<String>),
}

impl From<String> for ToolContent {
    fn from(value: String) -> Self {
        ToolContent::String(value)
    }
}

impl From<&str> for ToolContent {
    fn from(value: &str) -> Self {
        ToolContent::String(value.to_string())
    }
}

impl From<Vec<String>> for ToolContent {
    fn from(value: Vec<String>) -> Self {
        ToolContent::StringArray(value)
    }
}

impl fmt::Display for ToolContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolContent::String(text) => write!(f, "{}", text),
            ToolContent::StringArray(items) => write!(f, "{}", items.join("\n")),
        }
    }
}

/// Description of a tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A tool with a strongly typed input.
///
/// The input type doubles as the JSON schema source, so the arguments the
/// model is told about and the arguments we decode can't drift apart.
#[async_trait]
pub trait Tool: Send + Sync {
    type Input: DeserializeOwned + JsonSchema + Send;

    fn title(&self) -> &'static str;

    fn description(&self) -> &'static str;

    async fn run(&self, input: Self::Input) -> ToolResult;
}
