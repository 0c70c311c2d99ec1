use super::schema::UmbraConfig;
use crate::script::ScriptTemplate;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./umbra.yaml
    /// 2. ~/.umbra/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<UmbraConfig, ConfigError> {
        let local_config = PathBuf::from("./umbra.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".umbra").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(UmbraConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<UmbraConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: UmbraConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Traversal script selected by the config: the override file when one
    /// is set, otherwise the embedded script.
    pub async fn load_script(config: &UmbraConfig) -> Result<ScriptTemplate, ConfigError> {
        match &config.search.script_path {
            Some(path) => {
                tracing::info!("Loading traversal script from {}", path.display());
                let source = tokio::fs::read_to_string(path).await?;
                Ok(ScriptTemplate::from_source(source))
            }
            None => Ok(ScriptTemplate::embedded()),
        }
    }
}
