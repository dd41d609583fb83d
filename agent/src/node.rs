use crate::checkpoint::Checkpointer;
use crate::graph::{ConversationState, GraphError, NodeSubgraph};
use config::{NodeConfig, NodeRole, Outcome};
use providers::{BaseProvider, Message};
use std::path::Path;
use std::sync::Arc;
use tools::ToolRegistry;
use tracing::{info, Instrument};

/// Label returned when there is nowhere left to go.
pub const END: &str = "end";

/// Prefix a supervisor uses to name the next node in its answer.
const NEXT_PREFIX: &str = "NEXT:";

/// One unit of work in a supervisor-driven conversation.
///
/// Owns a [`NodeSubgraph`] and adapts between the caller's conversation and
/// the node's own checkpointed one.
pub struct Node<P: BaseProvider> {
    config: NodeConfig,
    subgraph: NodeSubgraph<P>,
}

impl<P: BaseProvider> Node<P> {
    /// Build the node. With `log_dir` set, a diagram of the subgraph is
    /// written there on a best-effort basis.
    pub fn new(
        config: NodeConfig,
        provider: P,
        tools: ToolRegistry,
        checkpointer: Arc<dyn Checkpointer>,
        log_dir: Option<&Path>,
    ) -> Result<Self, GraphError> {
        let subgraph = NodeSubgraph::compile(&config, provider, tools, checkpointer)?;
        if let Some(dir) = log_dir {
            subgraph.export_diagram(dir);
        }
        Ok(Node { config, subgraph })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn subgraph(&self) -> &NodeSubgraph<P> {
        &self.subgraph
    }

    /// Hand the caller's latest message to this node and fold the answer
    /// back into the caller's conversation.
    pub async fn invoke(&self, outer: ConversationState) -> Result<ConversationState, GraphError> {
        let span = tracing::info_span!(
            "node",
            node = %self.config.name,
            log_target = %self.config.log_target
        );
        self.invoke_inner(outer).instrument(span).await
    }

    async fn invoke_inner(
        &self,
        mut outer: ConversationState,
    ) -> Result<ConversationState, GraphError> {
        let handover = outer.last_message().cloned().ok_or(GraphError::EmptyInput)?;
        let input = ConversationState {
            messages: vec![handover],
            remaining_steps: outer.remaining_steps,
            prev_agent: outer.prev_agent.clone(),
            remaining_steps_display: outer.remaining_steps,
        };

        let result = self.subgraph.invoke(input).await?;
        let content = result
            .last_message()
            .map(|message| message.content.clone())
            .unwrap_or_default();

        info!(
            prev_agent = %result.prev_agent,
            remaining_steps = result.remaining_steps,
            "Node finished"
        );

        outer.remaining_steps_display = outer.remaining_steps;
        outer
            .messages
            .push(Message::human(content).with_name(self.config.graph_name()));
        outer.prev_agent = result.prev_agent;
        outer.remaining_steps = outer.remaining_steps.min(result.remaining_steps);
        Ok(outer)
    }

    /// How the last invocation went, judged from who claimed the state.
    pub fn outcome(&self, outer: &ConversationState) -> Outcome {
        if outer.prev_agent == self.config.name {
            Outcome::Completed
        } else {
            Outcome::BudgetExhausted
        }
    }

    /// Label of the node that should run next.
    ///
    /// Workers follow their transition map and fall back to the supervisor.
    /// Supervisors honour a `NEXT: <label>` line in their answer when the
    /// label is one of their transition targets or [`END`].
    pub fn decide_next(&self, outer: &ConversationState) -> String {
        let outcome = self.outcome(outer);
        match self.config.role {
            NodeRole::Worker => self
                .config
                .transition(outcome)
                .unwrap_or(crate::graph::SUPERVISOR)
                .to_string(),
            NodeRole::Supervisor => {
                let requested = (outcome == Outcome::Completed)
                    .then(|| outer.last_message())
                    .flatten()
                    .and_then(|message| requested_next(&message.content))
                    .filter(|label| self.is_known_target(label));

                match requested {
                    Some(label) => label.to_string(),
                    None => self.config.transition(outcome).unwrap_or(END).to_string(),
                }
            }
        }
    }

    fn is_known_target(&self, label: &str) -> bool {
        label == END || self.config.transition_map.values().any(|target| target == label)
    }
}

impl<P: BaseProvider> std::fmt::Debug for Node<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("config", &self.config)
            .field("subgraph", &self.subgraph)
            .finish()
    }
}

/// Last `NEXT: <label>` line of a supervisor answer.
fn requested_next(content: &str) -> Option<&str> {
    content
        .lines()
        .rev()
        .filter_map(|line| line.trim().strip_prefix(NEXT_PREFIX))
        .map(str::trim)
        .find(|label| !label.is_empty())
}
