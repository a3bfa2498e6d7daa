use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mcp_ssh_server::cli::{self, Cli, Command};
use mcp_ssh_server::config::ServerConfig;
use mcp_ssh_server::server::McpServer;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout carries protocol traffic, so logs go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.load_config().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {e:#}");
        ServerConfig::default()
    });

    match &cli.command {
        None => {
            tracing::debug!("Password helpers in order: {:?}", config.strategies);
            McpServer::new(config).run().await?;
        }
        Some(Command::Config { write: false }) => cli::print_config(&config)?,
        Some(Command::Config { write: true }) => {
            cli::write_config(&config, &cli.config_path()?)?;
        }
        Some(Command::Check) => cli::check_helpers(&config).await?,
    }

    Ok(())
}
