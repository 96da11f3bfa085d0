//! Project and user configuration.
//!
//! - Project: `depdag.toml` in the working directory (or `--config <path>`).
//! - User: `<config_dir>/depdag/config.toml`.
//!
//! Both files are optional, and every key has a serde default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_FILE: &str = "depdag.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Preferred output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default = "default_true")]
    pub show_metrics: bool,
    #[serde(default = "default_true")]
    pub expand_nodes: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: None,
            show_metrics: default_true(),
            expand_nodes: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_file")]
    pub default_file: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            default_file: default_input_file(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

/// Load the project config at `path`, or defaults if it does not exist.
pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("depdag/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_true() -> bool {
    true
}

fn default_input_file() -> PathBuf {
    PathBuf::from("data/tasks.json")
}
