pub mod export;
pub mod iter;
pub mod models;
pub mod nodes;
pub mod runner;
pub mod step_gate;

// Re-export common types for convenience
pub use export::{export_graph, render_dot};
pub use iter::GraphIter;
pub use models::{
    ConversationState, CurrentNode, Deps, GraphError, NodeRunner, NodeTransition, TRANSITIONS,
};
pub use nodes::{End, ModelStep, ToolStep};
pub use runner::NodeSubgraph;
pub use step_gate::{StepDecision, StepGate, STEP_FLOOR, SUPERVISOR};
