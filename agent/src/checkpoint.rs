use crate::graph::ConversationState;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persists conversation state between invocations, keyed by session id.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>>;

    async fn save(&self, session_id: &str, state: &ConversationState) -> Result<()>;
}

/// Process-local checkpoint store. Clones share the same sessions.
#[derive(Debug, Clone, Default)]
pub struct MemorySaver {
    sessions: Arc<RwLock<HashMap<String, ConversationState>>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl Checkpointer for MemorySaver {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, state: &ConversationState) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), state.clone());
        Ok(())
    }
}

/// One JSON document per session under `dir`.
#[derive(Debug, Clone)]
pub struct FileCheckpointer {
    dir: PathBuf,
}

impl FileCheckpointer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCheckpointer { dir: dir.into() }
    }

    /// Percent-encoded so distinct session ids never share a file.
    fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", urlencoding::encode(session_id)))
    }
}

#[async_trait]
impl Checkpointer for FileCheckpointer {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>> {
        let path = self.path_for(session_id);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let state = serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse checkpoint {}", path.display()))?;
        Ok(Some(state))
    }

    async fn save(&self, session_id: &str, state: &ConversationState) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.path_for(session_id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(state)?;

        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to move checkpoint into {}", path.display()))?;

        tracing::debug!(session = session_id, path = %path.display(), "Saved checkpoint");
        Ok(())
    }
}
