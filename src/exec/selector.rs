use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::config::{ServerConfig, StrategyKind};

use super::strategy::PasswordStrategy;
use super::{ExecOutcome, ExpectStrategy, RemoteRequest, RemoteRunner, SshpassStrategy};

/// Tries password strategies in the order they were added.
///
/// A strategy reporting [`ExecOutcome::Unavailable`] hands over to the next
/// one. Any other result, including an error, ends the search: a helper that
/// exists but failed is not a reason to try a different helper.
pub struct StrategySelector {
    strategies: Vec<Box<dyn PasswordStrategy>>,
}

impl StrategySelector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn PasswordStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Build the chain described by `config.strategies`.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        config
            .strategies
            .iter()
            .fold(Self::new(), |selector, kind| match kind {
                StrategyKind::Sshpass => {
                    selector.with_strategy(Box::new(SshpassStrategy::from_config(config)))
                }
                StrategyKind::Expect => {
                    selector.with_strategy(Box::new(ExpectStrategy::from_config(config)))
                }
            })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Whether each strategy's helper can be spawned, in selection order.
    pub async fn installed(&self) -> Vec<(&'static str, bool)> {
        let mut report = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            report.push((strategy.name(), strategy.is_installed().await));
        }
        report
    }
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

#[async_trait]
impl RemoteRunner for StrategySelector {
    async fn run_remote(&self, request: &RemoteRequest) -> Result<ExecOutcome> {
        for strategy in &self.strategies {
            debug!("Trying password strategy: {}", strategy.name());

            match strategy.run(request).await? {
                ExecOutcome::Unavailable => {
                    debug!("Password strategy {} unavailable", strategy.name());
                }
                outcome => return Ok(outcome),
            }
        }

        debug!("No password strategy available");
        Ok(ExecOutcome::Unavailable)
    }

    fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}
