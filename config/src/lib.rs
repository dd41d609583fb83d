mod error;
mod models;
mod prompt;

pub use error::ConfigError;
pub use models::{Config, NodeConfig, NodeRole, Outcome};
pub use prompt::{read_system_prompt, resolve_system_prompt_path, ConfigDocument};
pub use providers::ProviderType;

use std::env;
use std::fs;
use std::path::Path;

const CONFIG_FILE_NAME: &str = "stepwise.yml";

/// Attempts to load the configuration from a file.
/// First checks the current working directory, then falls back to ~/.config/stepwise/stepwise.yml
pub fn load_config_file() -> Result<Config, ConfigError> {
    let cwd_config = env::current_dir()?.join(CONFIG_FILE_NAME);

    let home_config = dirs::home_dir()
        .map(|home| home.join(".config").join("stepwise").join(CONFIG_FILE_NAME));

    let config_path = if cwd_config.exists() {
        cwd_config
    } else {
        match home_config {
            Some(path) if path.exists() => path,
            _ => return Err(ConfigError::NotFound),
        }
    };

    load_config_from(&config_path)
}

/// Load and validate a configuration file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = serde_yaml::from_str(&contents)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), nodes = config.nodes.len(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "provider: anthropic\nmodel: m\nstep_budget: 12\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.step_budget, 12);
        assert!(config.nodes.is_empty());
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "provider: [").unwrap();

        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}
