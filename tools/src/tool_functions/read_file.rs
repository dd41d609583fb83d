use crate::models::{Tool, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::fs;

/// Input parameters for the read_file tool
#[derive(Deserialize, JsonSchema, Debug)]
pub struct ReadFileInput {
    /// The path of the file to read
    pub path: String,
}

/// Tool for reading a file as text
#[derive(Debug, Clone)]
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    type Input = ReadFileInput;

    fn title(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Reads the contents of a text file at the specified path. Use absolute paths when possible \
        to avoid ambiguity."
    }

    async fn run(&self, input: ReadFileInput) -> ToolResult {
        match fs::read_to_string(&input.path).await {
            Ok(contents) => ToolResult::ok(contents),
            Err(e) => ToolResult::error(format!("Failed to read file '{}': {}", input.path, e)),
        }
    }
}
