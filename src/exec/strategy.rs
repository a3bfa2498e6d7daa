use anyhow::Result;
use async_trait::async_trait;

use super::{ExecOutcome, RemoteRequest};

/// One way of getting a password into a non-interactive `ssh` run.
///
/// Implementations return [`ExecOutcome::Unavailable`] when their helper
/// program is not installed, so the selector can move on to the next one.
/// Any other failure to run the helper is an `Err`.
#[async_trait]
pub trait PasswordStrategy: Send + Sync {
    async fn run(&self, request: &RemoteRequest) -> Result<ExecOutcome>;

    /// Whether the helper program can be spawned at all.
    async fn is_installed(&self) -> bool;

    /// Used for logging and error messages.
    fn name(&self) -> &'static str;
}
