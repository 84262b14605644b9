use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use retrend_core::CoreConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration that can be loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Backend base URL, overrides `RETREND_API_URL`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Directory holding `session.json`, overrides `RETREND_DATA_DIR`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize config")
    }

    /// Layer file values over an environment-derived core config
    pub fn apply(&self, mut core: CoreConfig) -> CoreConfig {
        if let Some(url) = &self.api_base_url {
            core = core.with_api_base_url(url.clone());
        }
        if let Some(dir) = &self.data_dir {
            core.data_dir = dir.clone();
        }
        core
    }
}
