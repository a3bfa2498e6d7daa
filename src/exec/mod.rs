//! Running commands on the remote host through the external `ssh` client.
//!
//! `ssh` cannot take a password non-interactively, so every run goes through
//! a password helper. Which helpers exist differs between machines, so the
//! [`StrategySelector`] tries each configured [`PasswordStrategy`] in order
//! and uses the first one whose helper can be spawned.

mod expect;
mod process;
mod selector;
mod ssh;
mod sshpass;
mod strategy;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::session::SessionCredentials;

pub use expect::ExpectStrategy;
pub use selector::StrategySelector;
pub use ssh::SshOptions;
pub use sshpass::SshpassStrategy;
pub use strategy::PasswordStrategy;

/// One remote command to run.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub credentials: SessionCredentials,
    pub command: String,
    /// Passed to ssh as `ConnectTimeout`.
    pub connect_timeout: Option<Duration>,
    /// Hard wall-clock limit for the whole helper process.
    pub timeout: Duration,
}

/// What the helper process reported after running to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Name of the strategy that ran the command.
    pub strategy: &'static str,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best available explanation for a failed run: stderr if there is any,
    /// otherwise whatever the helper's exit status means.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if self.strategy == expect::NAME && !stdout.is_empty() {
            // expect runs ssh on a pty, so ssh's errors land on stdout.
            return stdout.to_string();
        }
        let meaning = match self.strategy {
            sshpass::NAME => sshpass::describe_exit_status(self.exit_code),
            expect::NAME => expect::describe_exit_status(self.exit_code),
            _ => None,
        };
        match meaning {
            Some(meaning) => format!("{meaning} (exit status {})", self.exit_code),
            None => format!("{} exited with status {}", self.strategy, self.exit_code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    Completed(ExecOutput),
    /// The helper is not installed.
    Unavailable,
    TimedOut,
}

/// The capability the tools need: run a command on a remote host with a
/// password. Unexpected failures come back as `Err`; the expected ones
/// (missing helper, timeout) are [`ExecOutcome`] variants.
#[async_trait]
pub trait RemoteRunner: Send + Sync {
    async fn run_remote(&self, request: &RemoteRequest) -> Result<ExecOutcome>;

    /// Names of the helpers this runner would try, in order. Shown to the
    /// client when none of them could be spawned.
    fn strategy_names(&self) -> Vec<&'static str>;
}
