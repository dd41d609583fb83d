use crate::graph::models::{ConversationState, CurrentNode, Deps, GraphError, NodeRunner};
use crate::graph::nodes::{End, ModelStep, ToolStep};
use providers::BaseProvider;
use tracing::{debug, Instrument};

/// Steps a conversation through the subgraph one state at a time
pub struct GraphIter<'a, P: BaseProvider> {
    deps: &'a Deps<P>,
    state: ConversationState,
    current_node: CurrentNode,
    finished: bool,
}

impl<'a, P: BaseProvider> GraphIter<'a, P> {
    /// Start at `agent` with the given state
    pub fn new(deps: &'a Deps<P>, state: ConversationState) -> Self {
        GraphIter {
            deps,
            state,
            current_node: CurrentNode::Agent,
            finished: false,
        }
    }

    /// Run the current node and advance.
    ///
    /// Yields the node that just ran. After `terminal` or the first error
    /// the iterator is exhausted.
    pub async fn next(&mut self) -> Option<std::result::Result<CurrentNode, GraphError>> {
        if self.finished {
            return None;
        }

        let node = self.current_node;
        let span = tracing::debug_span!("state", node = %self.deps.name, state = %node);
        let result = match node {
            CurrentNode::Agent => ModelStep.run(&mut self.state, self.deps).instrument(span).await,
            CurrentNode::Tools => ToolStep.run(&mut self.state, self.deps).instrument(span).await,
            CurrentNode::Terminal => {
                self.finished = true;
                return Some(
                    End.run(&mut self.state, self.deps)
                        .instrument(span)
                        .await
                        .map(|_| node),
                );
            }
        };

        match result.and_then(|transition| node.next(transition)) {
            Ok(next) => {
                debug!(node = %self.deps.name, from = %node, to = %next, "Transition");
                self.current_node = next;
                Some(Ok(node))
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }

    /// Drive the machine until `terminal` has run.
    pub async fn run_to_end(mut self) -> std::result::Result<ConversationState, GraphError> {
        while let Some(step) = self.next().await {
            step?;
        }
        Ok(self.state)
    }

    pub fn into_state(self) -> ConversationState {
        self.state
    }
}
