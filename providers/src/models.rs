use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;
use std::future::Future;
use tools::ToolSpec;

use crate::anthropic::AnthropicProvider;

/// Represents the role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::Human => write!(f, "human"),
            Role::Ai => write!(f, "ai"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A request from the model to run a tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// A single entry of a conversation.
///
/// Messages are never edited after they are appended to a conversation;
/// the builder-style helpers below are only meant for constructing them.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Message {
            role,
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }

    pub fn ai_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message {
            tool_calls,
            ..Self::new(Role::Ai, content)
        }
    }

    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Message {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// The model capability: given the conversation so far and the tools on
/// offer, produce the next ai message.
pub trait BaseProvider: Send + Sync {
    fn query(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> impl Future<Output = Result<Message>> + Send;
}

/// Which backend a [`Provider`] talks to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Anthropic,
}

/// Settings shared by every provider backend
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
}

/// A provider factory that creates and manages specific LLM provider implementations
#[derive(Debug, Clone)]
pub enum Provider {
    Anthropic(AnthropicProvider),
}

impl Provider {
    pub fn new(provider_type: ProviderType, settings: ProviderSettings) -> Result<Self> {
        match provider_type {
            ProviderType::Anthropic => Ok(Provider::Anthropic(AnthropicProvider::new(settings)?)),
        }
    }
}

impl BaseProvider for Provider {
    async fn query(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<Message> {
        match self {
            Provider::Anthropic(provider) => provider.query(messages, tools).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_messages_omit_empty_fields() {
        let value = serde_json::to_value(Message::human("hi")).unwrap();
        assert_eq!(value, json!({"role": "human", "content": "hi"}));
    }

    #[test]
    fn tool_messages_carry_their_call_id() {
        let message = Message::tool("42", "call_1");
        assert_eq!(message.role, Role::Tool);
        assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));

        let parsed: Message = serde_json::from_value(serde_json::to_value(&message).unwrap()).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn ai_messages_report_tool_calls() {
        let call = ToolCall {
            id: "call_1".into(),
            name: "read_file".into(),
            arguments: json!({"path": "a"}),
        };
        assert!(Message::ai_with_tool_calls("", vec![call]).has_tool_calls());
        assert!(!Message::ai("done").has_tool_calls());
    }
}
