use crate::checkpoint::Checkpointer;
use crate::graph::export::export_graph;
use crate::graph::iter::GraphIter;
use crate::graph::models::{ConversationState, Deps, GraphError};
use config::NodeConfig;
use providers::BaseProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// A node's compiled agent/tools loop, bound to a checkpoint store
pub struct NodeSubgraph<P: BaseProvider> {
    deps: Deps<P>,
    session_id: String,
    checkpointer: Arc<dyn Checkpointer>,
}

impl<P: BaseProvider> NodeSubgraph<P> {
    /// Validate `config` and load its system prompt.
    ///
    /// Fails with [`GraphError::Configuration`] when the prompt can't be
    /// resolved or read.
    pub fn compile(
        config: &NodeConfig,
        provider: P,
        tools: tools::ToolRegistry,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Result<Self, GraphError> {
        config.validate()?;
        let system_prompt = config.load_system_prompt()?;

        Ok(NodeSubgraph {
            deps: Deps {
                name: config.name.clone(),
                intro_message: config.intro_message.clone(),
                provider,
                tools,
                system_prompt,
            },
            session_id: config.session_id(),
            checkpointer,
        })
    }

    pub fn deps(&self) -> &Deps<P> {
        &self.deps
    }

    /// Default checkpoint key, `<name>_graph_id`
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Step through `state` without touching the checkpoint store.
    pub fn iter(&self, state: ConversationState) -> GraphIter<'_, P> {
        GraphIter::new(&self.deps, state)
    }

    pub async fn run(&self, state: ConversationState) -> Result<ConversationState, GraphError> {
        self.iter(state).run_to_end().await
    }

    /// Run the node's default session.
    pub async fn invoke(&self, input: ConversationState) -> Result<ConversationState, GraphError> {
        self.invoke_session(&self.session_id, input).await
    }

    /// Resume `session_id` with `input`, run to `terminal` and checkpoint.
    ///
    /// Nothing is saved when the run fails.
    pub async fn invoke_session(
        &self,
        session_id: &str,
        input: ConversationState,
    ) -> Result<ConversationState, GraphError> {
        let saved = self
            .checkpointer
            .load(session_id)
            .await
            .map_err(GraphError::Checkpoint)?;

        let state = match saved {
            Some(saved) => {
                info!(
                    node = %self.deps.name,
                    session = session_id,
                    messages = saved.messages.len(),
                    "Resuming session"
                );
                saved.resume_with(input)
            }
            None => input,
        };

        let state = self.run(state).await?;

        self.checkpointer
            .save(session_id, &state)
            .await
            .map_err(GraphError::Checkpoint)?;

        Ok(state)
    }

    /// Write the state machine diagram under `dir`. Failures are logged
    /// and otherwise ignored.
    pub fn export_diagram(&self, dir: &Path) -> Option<PathBuf> {
        match export_graph(dir, &self.deps.name) {
            Ok(path) => {
                info!(node = %self.deps.name, path = %path.display(), "Exported graph");
                Some(path)
            }
            Err(err) => {
                warn!(node = %self.deps.name, dir = %dir.display(), "Failed to export graph: {}", err);
                None
            }
        }
    }
}

impl<P: BaseProvider> std::fmt::Debug for NodeSubgraph<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSubgraph")
            .field("deps", &self.deps)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}
