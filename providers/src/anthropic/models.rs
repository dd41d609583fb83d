use crate::models::{Message, Role, ToolCall};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use tools::ToolSpec;

/// Represents the role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnthropicRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// Represents different types of content items in a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AnthropicContentBlock {
    /// The result of a tool execution
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
    },

    /// Plain text content
    #[serde(rename = "text")]
    Text { text: String },

    /// A request to use a tool
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnthropicMessage {
    pub role: AnthropicRole,
    pub content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnthropicTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl From<&ToolSpec> for AnthropicTool {
    fn from(spec: &ToolSpec) -> Self {
        AnthropicTool {
            name: spec.name.clone(),
            description: spec.description.clone(),
            input_schema: spec.input_schema.clone(),
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: Option<String>,
    pub temperature: Option<f64>,
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<AnthropicTool>,
}

impl AnthropicRequest {
    /// Translate a conversation into the Messages API shape.
    ///
    /// System messages move to the top-level `system` field, tool results
    /// travel as `user` turns, and adjacent turns with the same role are
    /// merged since the API requires strict alternation.
    pub fn build(
        model: &str,
        max_tokens: u32,
        temperature: Option<f64>,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<Self> {
        let mut system = Vec::new();
        let mut turns: Vec<AnthropicMessage> = Vec::new();

        for message in messages {
            let (role, blocks) = match message.role {
                Role::System => {
                    system.push(message.content.clone());
                    continue;
                }
                Role::Human => (
                    AnthropicRole::User,
                    vec![AnthropicContentBlock::Text {
                        text: message.content.clone(),
                    }],
                ),
                Role::Ai => {
                    let mut blocks = Vec::new();
                    if !message.content.is_empty() {
                        blocks.push(AnthropicContentBlock::Text {
                            text: message.content.clone(),
                        });
                    }
                    blocks.extend(message.tool_calls.iter().map(|call| {
                        AnthropicContentBlock::ToolUse {
                            id: call.id.clone(),
                            name: call.name.clone(),
                            input: call.arguments.clone(),
                        }
                    }));
                    if blocks.is_empty() {
                        // The API rejects assistant turns without content.
                        continue;
                    }
                    (AnthropicRole::Assistant, blocks)
                }
                Role::Tool => {
                    let Some(tool_use_id) = message.tool_call_id.clone() else {
                        bail!("Tool message is missing its tool_call_id");
                    };
                    (
                        AnthropicRole::User,
                        vec![AnthropicContentBlock::ToolResult {
                            tool_use_id,
                            content: message.content.clone(),
                        }],
                    )
                }
            };

            match turns.last_mut() {
                Some(last) if last.role == role => last.content.extend(blocks),
                _ => turns.push(AnthropicMessage {
                    role,
                    content: blocks,
                }),
            }
        }

        Ok(AnthropicRequest {
            model: model.to_string(),
            max_tokens,
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            temperature,
            messages: turns,
            tools: tools.iter().map(AnthropicTool::from).collect(),
        })
    }
}

/// Represents the reason why the LLM stopped generating text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnthropicStopReason {
    #[serde(rename = "end_turn")]
    EndTurn,
    #[serde(rename = "max_tokens")]
    MaxTokens,
    #[serde(rename = "stop_sequence")]
    StopSequence,
    #[serde(rename = "tool_use")]
    ToolUse,
}

/// Represents usage statistics for the API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// A response structure for Anthropic API
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    pub id: String,
    pub content: Vec<AnthropicContentBlock>,
    pub stop_reason: Option<AnthropicStopReason>,
    pub usage: Option<AnthropicUsage>,
}

impl TryFrom<AnthropicResponse> for Message {
    type Error = anyhow::Error;

    fn try_from(response: AnthropicResponse) -> Result<Self, Self::Error> {
        let mut text = Vec::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                AnthropicContentBlock::Text { text: chunk } => text.push(chunk),
                AnthropicContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                    id,
                    name,
                    arguments: input,
                }),
                AnthropicContentBlock::ToolResult { .. } => {
                    bail!("Unexpected tool_result block in response {}", response.id)
                }
            }
        }

        Ok(Message::ai_with_tool_calls(text.join("\n"), tool_calls))
    }
}
