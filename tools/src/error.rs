use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments for tool `{name}`: {source}")]
    InvalidArguments {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to build schema for tool `{name}`: {source}")]
    Schema {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}
