use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::notify::MailConfig;

pub const CONFIG_FILE: &str = "donotscan.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Where the rule store lives; relative paths resolve against the
    /// working directory.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Verbose engine logging.
    #[serde(default)]
    pub debug: bool,

    /// Outbound mail settings. Absent means notifications are logged only.
    pub mail: Option<MailConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            debug: false,
            mail: None,
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("rules.toml")
}

/// Load configuration from `donotscan.toml` in the working directory. A
/// missing file means defaults.
pub fn load_config() -> Result<Config> {
    let path = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE);
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
