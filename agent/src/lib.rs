pub mod checkpoint;
pub mod graph;
pub mod node;

pub use checkpoint::{Checkpointer, FileCheckpointer, MemorySaver};
pub use graph::{
    ConversationState, CurrentNode, Deps, GraphError, GraphIter, NodeRunner, NodeSubgraph,
    NodeTransition, StepDecision, StepGate, SUPERVISOR,
};
pub use node::{Node, END};
