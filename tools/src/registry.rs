use crate::error::ToolError;
use crate::models::{Tool, ToolResult, ToolSpec};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Object-safe view of a [`Tool`], decoding raw JSON arguments into the
/// tool's typed input.
#[async_trait]
pub trait DynTool: Send + Sync {
    fn spec(&self) -> Result<ToolSpec, ToolError>;

    async fn call(&self, arguments: Value) -> Result<ToolResult, ToolError>;
}

#[async_trait]
impl<T> DynTool for T
where
    T: Tool + 'static,
{
    fn spec(&self) -> Result<ToolSpec, ToolError> {
        let schema = schemars::schema_for!(T::Input);
        let input_schema = serde_json::to_value(schema).map_err(|source| ToolError::Schema {
            name: self.title().to_string(),
            source,
        })?;

        Ok(ToolSpec {
            name: self.title().to_string(),
            description: self.description().to_string(),
            input_schema,
        })
    }

    async fn call(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let input: T::Input =
            serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments {
                name: self.title().to_string(),
                source,
            })?;

        Ok(self.run(input).await)
    }
}

/// Fixed set of tools available to a node, looked up by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn DynTool>>,
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any previous tool with the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<(), ToolError> {
        let spec = DynTool::spec(&tool)?;
        self.specs.retain(|existing| existing.name != spec.name);
        self.tools.insert(spec.name.clone(), Arc::new(tool));
        self.specs.push(spec);
        Ok(())
    }

    pub fn with<T: Tool + 'static>(mut self, tool: T) -> Result<Self, ToolError> {
        self.register(tool)?;
        Ok(self)
    }

    /// Specs in registration order.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tracing::debug!(tool = name, %arguments, "Calling tool");
        tool.call(arguments).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.specs.iter().map(|spec| spec.name.as_str()).collect();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}
