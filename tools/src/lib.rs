pub mod error;
pub mod models;
pub mod registry;
pub mod tool_functions;

pub use error::ToolError;
pub use models::{Tool, ToolContent, ToolResult, ToolSpec};
pub use registry::{DynTool, ToolRegistry};

pub use tool_functions::list_files::{ListFilesInput, ListFilesTool};
pub use tool_functions::read_file::{ReadFileInput, ReadFileTool};
pub use tool_functions::run_command::{RunCommandInput, RunCommandTool};
pub use tool_functions::write_file::{WriteFileInput, WriteFileTool};

/// Registry holding every built-in tool.
pub fn builtin_registry() -> Result<ToolRegistry, ToolError> {
    ToolRegistry::new()
        .with(RunCommandTool)?
        .with(ReadFileTool)?
        .with(WriteFileTool)?
        .with(ListFilesTool)
}
