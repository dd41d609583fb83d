#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use config::NodeConfig;
use providers::{BaseProvider, Message, ToolCall};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tools::{Tool, ToolResult, ToolSpec};

pub const SYSTEM_PROMPT: &str = "You are a careful worker.";

/// Replays canned answers and records what it was asked.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<Message>>>,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(replies: impl IntoIterator<Item = Message>) -> Self {
        ScriptedProvider {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Conversations handed to the model, one per call.
    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }
}

impl BaseProvider for ScriptedProvider {
    async fn query(&self, messages: &[Message], _tools: &[ToolSpec]) -> Result<Message> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted reply left"))
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct CountInput {
    pub label: String,
}

/// Counts its runs and answers with the running total.
#[derive(Clone, Default)]
pub struct CountingTool {
    pub runs: Arc<AtomicUsize>,
}

#[async_trait]
impl Tool for CountingTool {
    type Input = CountInput;

    fn title(&self) -> &'static str {
        "count"
    }

    fn description(&self) -> &'static str {
        "Count how many times it has been called"
    }

    async fn run(&self, input: CountInput) -> ToolResult {
        let total = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        ToolResult::ok(format!("{}: {}", input.label, total))
    }
}

pub fn count_call(id: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: "count".to_string(),
        arguments: json!({ "label": id }),
    }
}

/// Node config whose prompt document and prompt file live under `dir`.
pub fn node_config(dir: &Path, name: &str) -> NodeConfig {
    let prompt = dir.join(format!("{}.txt", name));
    std::fs::write(&prompt, SYSTEM_PROMPT).unwrap();

    let document = dir.join(format!("{}.json", name));
    let body = json!({ "worker_system_prompt_filename": prompt });
    std::fs::write(&document, body.to_string()).unwrap();

    NodeConfig::new(name, format!("{}.log", name), document)
        .with_system_prompt_key("worker_system_prompt_filename")
}
