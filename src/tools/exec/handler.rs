use serde_json::Value;

use crate::envelope::ToolResult;
use crate::error::ToolError;
use crate::exec::{ExecOutcome, ExecOutput, RemoteRequest};
use crate::tools::ToolContext;

use super::schema::ExecInput;

/// Returned instead of an empty string when a command prints nothing.
pub const EMPTY_OUTPUT_PLACEHOLDER: &str = "Command completed";

pub async fn handle(ctx: ToolContext<'_>, arguments: Value) -> ToolResult {
    match exec(ctx, arguments).await {
        Ok(text) => ToolResult::text(text),
        Err(e @ ToolError::NotConnected) => ToolResult::error(e.to_string()),
        Err(ToolError::Timeout(secs)) => {
            tracing::warn!("Command timed out after {secs}s");
            ToolResult::error("Command timeout")
        }
        Err(e) => ToolResult::error(format!("Command error: {e}")),
    }
}

async fn exec(ctx: ToolContext<'_>, arguments: Value) -> Result<String, ToolError> {
    let credentials = ctx
        .session
        .credentials()
        .cloned()
        .ok_or(ToolError::NotConnected)?;
    let input: ExecInput = serde_json::from_value(arguments)?;

    tracing::debug!("Running command on {}", credentials.destination());
    let request = RemoteRequest {
        credentials,
        command: input.command,
        connect_timeout: Some(ctx.config.connect_timeout()),
        timeout: ctx.config.exec_timeout(),
    };

    match ctx.runner.run_remote(&request).await? {
        ExecOutcome::Completed(output) => {
            let text = format_output(&output);
            if output.success() {
                ctx.session.mark_verified();
                Ok(text.unwrap_or_else(|| EMPTY_OUTPUT_PLACEHOLDER.to_string()))
            } else {
                let status = format!("exit status {}", output.exit_code);
                Err(ToolError::RemoteFailure(match text {
                    Some(text) => format!("{status}\n{text}"),
                    None => status,
                }))
            }
        }
        ExecOutcome::TimedOut => Err(ToolError::Timeout(request.timeout.as_secs())),
        ExecOutcome::Unavailable => Err(ToolError::StrategyUnavailable {
            tried: ctx.runner.strategy_names(),
        }),
    }
}

/// stdout, then stderr behind a `STDERR:` marker. `None` when both are empty.
#[must_use]
pub fn format_output(output: &ExecOutput) -> Option<String> {
    let mut text = output.stdout.clone();
    if !output.stderr.is_empty() {
        text.push_str("\nSTDERR: ");
        text.push_str(&output.stderr);
    }
    (!text.is_empty()).then_some(text)
}
