use crate::models::{Tool, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// Input parameters for the write_file tool
#[derive(Deserialize, JsonSchema, Debug)]
pub struct WriteFileInput {
    /// The path of the file to write
    pub path: String,
    /// The contents to write to the file
    pub contents: String,
}

/// Tool for writing content to files
#[derive(Debug, Clone)]
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    type Input = WriteFileInput;

    fn title(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Writes content to a file at the specified path, creating the file and any parent directories \
        if they don't exist. Use absolute paths when possible to avoid ambiguity. Be careful when using \
        this tool as it will overwrite existing files without warning. Always verify the path is correct."
    }

    async fn run(&self, input: WriteFileInput) -> ToolResult {
        if let Some(parent) = Path::new(&input.path).parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                return ToolResult::error(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ));
            }
        }

        match fs::write(&input.path, &input.contents).await {
            Ok(_) => ToolResult::ok(format!("Successfully wrote to file '{}'", input.path)),
            Err(e) => ToolResult::error(format!(
                "Failed to write to file '{}': {}",
                input.path, e
            )),
        }
    }
}
