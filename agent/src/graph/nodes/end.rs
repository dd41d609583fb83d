use crate::graph::models::{ConversationState, Deps, GraphError, NodeRunner, NodeTransition};
use providers::BaseProvider;

/// The terminal node
#[derive(Debug)]
pub struct End;

impl<P: BaseProvider> NodeRunner<P> for End {
    async fn run(
        &self,
        _state: &mut ConversationState,
        _deps: &Deps<P>,
    ) -> std::result::Result<NodeTransition, GraphError> {
        Ok(NodeTransition::Terminal)
    }
}
