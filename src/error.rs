//! Failures a tool handler can hit.
//!
//! None of these escape a handler: each one is folded into an error
//! envelope (`isError: true`) so the protocol loop keeps running.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// A required argument was missing or had the wrong type.
    #[error("{0}")]
    Validation(String),

    #[error("Please connect first using ssh_connect")]
    NotConnected,

    #[error("no password helper available (tried: {})", .tried.join(", "))]
    StrategyUnavailable { tried: Vec<&'static str> },

    #[error("timed out after {0}s")]
    Timeout(u64),

    /// The remote command ran but reported failure.
    #[error("{0}")]
    RemoteFailure(String),

    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        Self::Validation(e.to_string())
    }
}
