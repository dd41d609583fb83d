use crate::error::ConfigError;
use crate::prompt::{read_system_prompt, resolve_system_prompt_path};
use anyhow::Result;
use providers::{Provider, ProviderSettings, ProviderType, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::convert::TryFrom;
use std::path::PathBuf;

const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub provider: ProviderType,
    pub provider_base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    #[serde(default = "default_response_max_tokens")]
    pub response_max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Initial `remaining_steps` handed to a fresh conversation.
    #[serde(default = "default_step_budget")]
    pub step_budget: u32,
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Directory for file-backed checkpoints. In-memory when absent.
    #[serde(default)]
    pub checkpoint_dir: Option<PathBuf>,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_response_max_tokens() -> u32 {
    8192
}

fn default_step_budget() -> u32 {
    25
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs/misc")
}

impl Config {
    pub fn node(&self, name: &str) -> Option<&NodeConfig> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            node.validate()?;
            if !seen.insert(node.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate node name `{}`",
                    node.name
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<&Config> for Provider {
    type Error = anyhow::Error;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        let api_key = match &config.api_key {
            Some(key) => key.clone(),
            None => std::env::var(API_KEY_ENV).unwrap_or_default(),
        };

        Provider::new(
            config.provider,
            ProviderSettings {
                api_key,
                model: config.model.clone(),
                base_url: config.provider_base_url.clone(),
                max_tokens: config.response_max_tokens,
                temperature: Some(config.temperature),
            },
        )
    }
}

/// Outcome of one node invocation, as seen by the routing hook
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The model produced a final answer
    Completed,
    /// The step budget ran out before the model was consulted
    BudgetExhausted,
}

/// Which routing behaviour a node uses after it has run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Picks the next node from the labels named in its own answer
    Supervisor,
    /// Follows the transition map for its outcome
    #[default]
    Worker,
}

/// Static description of one node. Built once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeConfig {
    pub name: String,
    #[serde(default = "default_intro_message")]
    pub intro_message: String,
    #[serde(default)]
    pub role: NodeRole,
    pub log_target: String,
    /// Key-value document mapping prompt keys to prompt files
    pub config_source: PathBuf,
    #[serde(default)]
    pub transition_map: BTreeMap<Outcome, String>,
    #[serde(default = "default_system_prompt_key")]
    pub system_prompt_key: String,
    #[serde(default = "default_system_prompt_path")]
    pub default_system_prompt_path: PathBuf,
}

fn default_intro_message() -> String {
    "<><><><><> 👑 SUPERVISOR 👑 <><><><><>".to_string()
}

fn default_system_prompt_key() -> String {
    "supervisor_system_prompt_filename".to_string()
}

fn default_system_prompt_path() -> PathBuf {
    PathBuf::from("prompts/exp-supervisor.txt")
}

impl NodeConfig {
    pub fn new(
        name: impl Into<String>,
        log_target: impl Into<String>,
        config_source: impl Into<PathBuf>,
    ) -> Self {
        NodeConfig {
            name: name.into(),
            intro_message: default_intro_message(),
            role: NodeRole::default(),
            log_target: log_target.into(),
            config_source: config_source.into(),
            transition_map: BTreeMap::new(),
            system_prompt_key: default_system_prompt_key(),
            default_system_prompt_path: default_system_prompt_path(),
        }
    }

    pub fn with_intro_message(mut self, intro_message: impl Into<String>) -> Self {
        self.intro_message = intro_message.into();
        self
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_transition(mut self, outcome: Outcome, target: impl Into<String>) -> Self {
        self.transition_map.insert(outcome, target.into());
        self
    }

    pub fn with_system_prompt_key(mut self, key: impl Into<String>) -> Self {
        self.system_prompt_key = key.into();
        self
    }

    pub fn with_default_system_prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_system_prompt_path = path.into();
        self
    }

    /// Checkpoint key under which this node's conversation is stored.
    pub fn session_id(&self) -> String {
        format!("{}_graph_id", self.name)
    }

    /// Author name stamped on messages the node hands back to its caller.
    pub fn graph_name(&self) -> String {
        format!("{}_graph", self.name)
    }

    pub fn transition(&self, outcome: Outcome) -> Option<&str> {
        self.transition_map.get(&outcome).map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("node name must not be empty".into()));
        }
        if let Some((outcome, _)) = self
            .transition_map
            .iter()
            .find(|(_, target)| target.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "node `{}` has an empty transition target for {:?}",
                self.name, outcome
            )));
        }
        Ok(())
    }

    pub fn system_prompt_path(&self) -> Result<PathBuf, ConfigError> {
        resolve_system_prompt_path(
            &self.config_source,
            &self.system_prompt_key,
            &self.default_system_prompt_path,
        )
    }

    /// Resolve and read this node's system prompt.
    pub fn load_system_prompt(&self) -> Result<String, ConfigError> {
        let path = self.system_prompt_path()?;
        read_system_prompt(&path)
    }
}
