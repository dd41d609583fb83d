use crate::graph::models::{ConversationState, Deps, GraphError, NodeRunner, NodeTransition};
use crate::graph::step_gate::{StepDecision, StepGate, SUPERVISOR};
use providers::BaseProvider;
use tracing::{debug, info};

/// The `agent` state
///
/// Asks the model for the next message given the whole history and the
/// node's tools. Routes to `tools` when the answer carries tool calls.
#[derive(Debug)]
pub struct ModelStep;

impl<P: BaseProvider> NodeRunner<P> for ModelStep {
    async fn run(
        &self,
        state: &mut ConversationState,
        deps: &Deps<P>,
    ) -> std::result::Result<NodeTransition, GraphError> {
        if StepGate::evaluate(state.remaining_steps) == StepDecision::Halt {
            info!(
                node = %deps.name,
                remaining_steps = state.remaining_steps,
                "Step budget exhausted, handing back to {}",
                SUPERVISOR
            );
            state.prev_agent = SUPERVISOR.to_string();
            return Ok(NodeTransition::ToEnd);
        }

        state.consume_step();
        state.ensure_system_prompt(&deps.system_prompt);

        let mut response = deps
            .provider
            .query(&state.messages, deps.tools.specs())
            .await
            .map_err(GraphError::ModelInvocation)?;

        info!("{}", deps.intro_message);
        debug!(node = %deps.name, response = ?response, "Model response");
        if let Some(call) = response.tool_calls.first() {
            info!(node = %deps.name, "Tool calls: {}", call.name);
        }
        if let Some(summary) = concise(&response.content) {
            info!(node = %deps.name, "Concise message: {}", summary);
        }

        if response.name.is_none() {
            response.name = Some(deps.name.clone());
        }
        let transition = NodeTransition::after_model(&response);
        state.messages.push(response);
        state.prev_agent = deps.name.clone();

        Ok(transition)
    }
}

/// First paragraph of a model answer, if it has any text.
fn concise(content: &str) -> Option<&str> {
    content
        .split("\n\n")
        .next()
        .filter(|paragraph| !paragraph.is_empty())
}
