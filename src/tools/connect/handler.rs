use serde_json::Value;

use crate::envelope::ToolResult;
use crate::error::ToolError;
use crate::exec::{ExecOutcome, RemoteRequest};
use crate::tools::ToolContext;

use super::schema::ConnectInput;

/// Harmless command run once to check the host and credentials.
const PROBE_COMMAND: &str = "echo 'Connection test successful'";

pub async fn handle(ctx: ToolContext<'_>, arguments: Value) -> ToolResult {
    match connect(ctx, arguments).await {
        Ok(text) => ToolResult::text(text),
        Err(ToolError::Timeout(secs)) => {
            tracing::warn!("Connection probe timed out after {secs}s");
            ToolResult::error("Connection timeout")
        }
        Err(e) => ToolResult::error(format!("Connection error: {e}")),
    }
}

async fn connect(ctx: ToolContext<'_>, arguments: Value) -> Result<String, ToolError> {
    let input: ConnectInput = serde_json::from_value(arguments)?;
    let credentials = input.into_credentials()?;
    let endpoint = credentials.destination();
    let port = credentials.port;

    // Last connect wins, whatever the probe says.
    ctx.session.store(credentials.clone());

    tracing::info!("Probing {endpoint}:{port}");
    let request = RemoteRequest {
        credentials,
        command: PROBE_COMMAND.to_string(),
        connect_timeout: Some(ctx.config.connect_timeout()),
        timeout: ctx.config.probe_timeout(),
    };

    match ctx.runner.run_remote(&request).await? {
        ExecOutcome::Completed(output) if output.success() => {
            ctx.session.mark_verified();
            tracing::info!("Connected to {endpoint}:{port} via {}", output.strategy);
            Ok(format!("Connection successful: {endpoint}"))
        }
        ExecOutcome::Completed(output) => Err(ToolError::RemoteFailure(output.diagnostic())),
        ExecOutcome::TimedOut => Err(ToolError::Timeout(request.timeout.as_secs())),
        ExecOutcome::Unavailable => {
            let tried = ctx.runner.strategy_names().join(", ");
            tracing::warn!("No password helper available, deferring verification of {endpoint}");
            Ok(format!(
                "Credentials stored for {endpoint}:{port}; no password helper available \
                 (tried: {tried}), verification deferred to the first ssh_exec"
            ))
        }
    }
}
