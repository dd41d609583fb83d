use crate::models::{Tool, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::fs;

/// Input parameters for the list_files tool
#[derive(Deserialize, JsonSchema, Debug)]
pub struct ListFilesInput {
    /// The directory whose immediate entries should be listed
    pub dir: String,
}

/// Tool for listing the entries of a single directory
#[derive(Debug, Clone)]
pub struct ListFilesTool;

#[async_trait]
impl Tool for ListFilesTool {
    type Input = ListFilesInput;

    fn title(&self) -> &'static str {
        "list_files"
    }

    fn description(&self) -> &'static str {
        "Lists the files and directories directly inside the given directory. The listing is not \
        recursive."
    }

    async fn run(&self, input: ListFilesInput) -> ToolResult {
        let mut entries = match fs::read_dir(&input.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                return ToolResult::error(format!(
                    "Failed to read directory '{}': {}",
                    input.dir, e
                ))
            }
        };

        let mut files = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if let Some(path_str) = entry.path().to_str() {
                        files.push(path_str.to_owned());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    return ToolResult::error(format!("Failed to read directory entry: {}", e))
                }
            }
        }
        files.sort();
        ToolResult::ok(files)
    }
}
