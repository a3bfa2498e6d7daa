use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Runtime settings for the server, loaded from `config.toml`.
///
/// Every field is optional in the file; anything left out falls back to
/// the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub ssh_program: String,
    pub sshpass_program: String,
    pub expect_program: String,
    /// Password helpers in order of preference.
    pub strategies: Vec<StrategyKind>,
    pub strict_host_key_checking: bool,
    pub connect_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub exec_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Sshpass,
    Expect,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".to_string(),
            sshpass_program: "sshpass".to_string(),
            expect_program: "expect".to_string(),
            strategies: vec![StrategyKind::Sshpass, StrategyKind::Expect],
            strict_host_key_checking: false,
            connect_timeout_secs: 10,
            probe_timeout_secs: 15,
            exec_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load from the default location, or return defaults if the file is absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("mcp-ssh-server").join("config.toml"))
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    #[must_use]
    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }
}
