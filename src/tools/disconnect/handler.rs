use crate::envelope::ToolResult;
use crate::tools::ToolContext;

pub fn handle(ctx: ToolContext<'_>) -> ToolResult {
    if ctx.session.clear() {
        tracing::info!("Session closed");
    } else {
        tracing::debug!("Disconnect requested with no active session");
    }
    ToolResult::text("Connection closed")
}
