use config::ConfigError;
use providers::{BaseProvider, Message, Role};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::future::Future;
use tools::{ToolError, ToolRegistry};

/// Custom error type for the graph
#[derive(Debug)]
pub enum GraphError {
    Configuration(ConfigError),
    ModelInvocation(anyhow::Error),
    ToolNotFound(String),
    ToolExecution { tool: String, source: ToolError },
    InvalidStateTransition(String),
    Checkpoint(anyhow::Error),
    EmptyInput,
}

impl Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::Configuration(err) => write!(f, "Configuration error: {}", err),
            GraphError::ModelInvocation(err) => write!(f, "Model invocation failed: {:#}", err),
            GraphError::ToolNotFound(tool) => write!(f, "Tool not found: {}", tool),
            GraphError::ToolExecution { tool, source } => {
                write!(f, "Tool `{}` failed: {}", tool, source)
            }
            GraphError::InvalidStateTransition(msg) => {
                write!(f, "Invalid state transition: {}", msg)
            }
            GraphError::Checkpoint(err) => write!(f, "Checkpoint error: {:#}", err),
            GraphError::EmptyInput => write!(f, "Conversation has no messages to hand over"),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Configuration(err) => Some(err),
            GraphError::ToolExecution { source, .. } => Some(source),
            GraphError::ModelInvocation(err) | GraphError::Checkpoint(err) => Some(&**err),
            _ => None,
        }
    }
}

impl From<ConfigError> for GraphError {
    fn from(err: ConfigError) -> Self {
        GraphError::Configuration(err)
    }
}

impl GraphError {
    pub(crate) fn from_tool(tool: &str, err: ToolError) -> Self {
        match err {
            ToolError::NotFound(name) => GraphError::ToolNotFound(name),
            source => GraphError::ToolExecution {
                tool: tool.to_string(),
                source,
            },
        }
    }
}

/// Conversation data threaded through the graph.
///
/// Steps only ever append to `messages`; the one exception is placing the
/// system prompt at index 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub remaining_steps: u32,
    #[serde(default)]
    pub prev_agent: String,
    #[serde(default)]
    pub remaining_steps_display: u32,
}

impl ConversationState {
    pub fn new(messages: Vec<Message>, remaining_steps: u32) -> Self {
        ConversationState {
            messages,
            remaining_steps,
            prev_agent: String::new(),
            remaining_steps_display: remaining_steps,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_ai_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Ai)
    }

    pub fn system_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::System)
            .count()
    }

    /// Exactly one system message, and it sits at index 0.
    pub fn has_system_prompt(&self) -> bool {
        matches!(self.messages.first(), Some(m) if m.role == Role::System)
            && self.system_message_count() == 1
    }

    /// Put `prompt` at index 0 unless a system message already leads the
    /// conversation. System messages found anywhere else are dropped.
    pub fn ensure_system_prompt(&mut self, prompt: &str) {
        if self.has_system_prompt() {
            return;
        }
        let leading = matches!(self.messages.first(), Some(m) if m.role == Role::System);
        let mut index = 0;
        self.messages.retain(|m| {
            let keep = m.role != Role::System || (leading && index == 0);
            index += 1;
            keep
        });
        if !leading {
            self.messages.insert(0, Message::system(prompt));
        }
    }

    /// Take one step off the budget. Never goes below zero.
    pub fn consume_step(&mut self) {
        self.remaining_steps = self.remaining_steps.saturating_sub(1);
    }

    /// Continue a checkpointed conversation with freshly supplied input.
    ///
    /// Messages accumulate and the budget only ever shrinks.
    pub fn resume_with(mut self, input: ConversationState) -> Self {
        self.messages.extend(input.messages);
        self.remaining_steps = self.remaining_steps.min(input.remaining_steps);
        self.remaining_steps_display = input.remaining_steps_display;
        if !input.prev_agent.is_empty() {
            self.prev_agent = input.prev_agent;
        }
        self
    }
}

/// Dependencies that nodes need to function
pub struct Deps<P: BaseProvider> {
    pub name: String,
    pub intro_message: String,
    pub provider: P,
    pub tools: ToolRegistry,
    pub system_prompt: String,
}

impl<P: BaseProvider> Debug for Deps<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deps")
            .field("name", &self.name)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

/// One state of the subgraph
pub trait NodeRunner<P: BaseProvider>: Debug {
    /// Run the node's logic
    fn run(
        &self,
        state: &mut ConversationState,
        deps: &Deps<P>,
    ) -> impl Future<Output = Result<NodeTransition, GraphError>> + Send;
}

/// Enum to represent all possible node transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTransition {
    ToAgent,
    ToTools,
    ToEnd,
    Terminal,
}

impl NodeTransition {
    /// Route out of `agent` once the model has answered.
    pub fn after_model(response: &Message) -> Self {
        if response.has_tool_calls() {
            NodeTransition::ToTools
        } else {
            NodeTransition::ToEnd
        }
    }
}

/// Enum representing the current node in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentNode {
    Agent,
    Tools,
    Terminal,
}

/// Every legal edge of the subgraph.
pub const TRANSITIONS: &[(CurrentNode, NodeTransition, CurrentNode)] = &[
    (CurrentNode::Agent, NodeTransition::ToTools, CurrentNode::Tools),
    (CurrentNode::Agent, NodeTransition::ToEnd, CurrentNode::Terminal),
    (CurrentNode::Tools, NodeTransition::ToAgent, CurrentNode::Agent),
];

impl CurrentNode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrentNode::Agent => "agent",
            CurrentNode::Tools => "tools",
            CurrentNode::Terminal => "terminal",
        }
    }

    /// Look up the state reached from `self` via `transition`.
    pub fn next(self, transition: NodeTransition) -> Result<CurrentNode, GraphError> {
        TRANSITIONS
            .iter()
            .find(|(from, via, _)| *from == self && *via == transition)
            .map(|(_, _, to)| *to)
            .ok_or_else(|| {
                GraphError::InvalidStateTransition(format!(
                    "{:?} is not a valid transition from {}",
                    transition,
                    self.as_str()
                ))
            })
    }
}

impl Display for CurrentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
