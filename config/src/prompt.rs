use crate::error::ConfigError;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A flat key-value document, JSON or YAML, naming prompt files by key.
#[derive(Debug, Default, Clone)]
pub struct ConfigDocument {
    entries: HashMap<String, Value>,
}

impl ConfigDocument {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::ParseDocument {
            path: path.to_path_buf(),
            source,
        })
    }

    /// YAML is a superset of JSON, so one parser covers both formats.
    pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let entries = serde_yaml::from_str(contents)?;
        Ok(ConfigDocument { entries })
    }

    /// The value for `key` as a path, when present and a string.
    pub fn get(&self, key: &str) -> Option<PathBuf> {
        self.entries
            .get(key)
            .and_then(Value::as_str)
            .map(PathBuf::from)
    }
}

/// Pick the system prompt file for a node: the document's entry for `key`,
/// or `default_path` when the document has none.
pub fn resolve_system_prompt_path(
    config_source: &Path,
    key: &str,
    default_path: &Path,
) -> Result<PathBuf, ConfigError> {
    let document = ConfigDocument::load(config_source)?;
    match document.get(key) {
        Some(path) => Ok(path),
        None => {
            tracing::debug!(
                key,
                default = %default_path.display(),
                "Prompt key not configured, using default"
            );
            Ok(default_path.to_path_buf())
        }
    }
}

pub fn read_system_prompt(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
