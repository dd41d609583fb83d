use crate::models::{Tool, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::process::Command;

/// Input parameters for the run_command tool
#[derive(Deserialize, JsonSchema, Debug)]
pub struct RunCommandInput {
    /// The command to run
    pub cmd: String,
    /// The arguments to pass to the command
    #[serde(default)]
    pub args: Vec<String>,
}

/// Tool for executing commands without a shell
#[derive(Debug, Clone)]
pub struct RunCommandTool;

#[async_trait]
impl Tool for RunCommandTool {
    type Input = RunCommandInput;

    fn title(&self) -> &'static str {
        "run_command"
    }

    fn description(&self) -> &'static str {
        "Executes a command with the specified arguments and returns its standard output. Avoid \
        commands that require interactive input as this tool doesn't handle stdin interactions."
    }

    async fn run(&self, input: RunCommandInput) -> ToolResult {
        let output = match Command::new(&input.cmd).args(&input.args).output().await {
            Ok(output) => output,
            Err(e) => return ToolResult::error(format!("Failed to execute command: {}", e)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            ToolResult::ok(stdout)
        } else {
            ToolResult::error(format!("Command failed ({}): {}", output.status, stderr))
        }
    }
}
