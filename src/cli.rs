use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::ServerConfig;
use crate::exec::StrategySelector;

/// MCP server exposing password-authenticated SSH as tools
#[derive(Parser, Debug)]
#[command(name = "mcp-ssh-server")]
#[command(version, about)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Path to config.toml (default: <config dir>/mcp-ssh-server/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective configuration as TOML
    Config {
        /// Write it to the config file instead, creating the file if needed
        #[arg(long)]
        write: bool,
    },

    /// Report which password helpers (sshpass, expect) are installed
    Check,
}

impl Cli {
    /// Load the config named by `--config`, or the default one.
    pub fn load_config(&self) -> Result<ServerConfig> {
        match &self.config {
            Some(path) => ServerConfig::load_from(path),
            None => ServerConfig::load(),
        }
    }

    /// The file `--config` names, or the default location.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => ServerConfig::config_path(),
        }
    }
}

pub fn print_config(config: &ServerConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Save `config` to `path` so it can be edited by hand.
pub fn write_config(config: &ServerConfig, path: &Path) -> Result<()> {
    config.save_to(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Print one line per password helper, in the order they will be tried.
pub async fn check_helpers(config: &ServerConfig) -> Result<()> {
    let selector = StrategySelector::from_config(config);
    if selector.is_empty() {
        println!("No password helpers configured.");
        return Ok(());
    }

    let report = selector.installed().await;
    for (name, installed) in &report {
        let status = if *installed { "installed" } else { "not found" };
        println!("  {name}: {status}");
    }

    if !report.iter().any(|(_, installed)| *installed) {
        println!();
        println!("No helper found. ssh_connect will store credentials without verifying them,");
        println!("and ssh_exec will fail until sshpass or expect is installed.");
    }
    Ok(())
}
