//! The three tools exposed over `tools/call`, and the dispatcher that
//! routes a call to one of them.

pub mod connect;
pub mod disconnect;
pub mod exec;

use serde::Serialize;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::envelope::ToolResult;
use crate::exec::RemoteRunner;
use crate::session::Session;

/// A tool as advertised by `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Everything a tool handler may touch during one call.
pub struct ToolContext<'a> {
    pub session: &'a mut Session,
    pub runner: &'a dyn RemoteRunner,
    pub config: &'a ServerConfig,
}

/// Descriptors for every tool, in a fixed order.
#[must_use]
pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        connect::schema::descriptor(),
        exec::schema::descriptor(),
        disconnect::schema::descriptor(),
    ]
}

/// Route a tool call by name. Never fails: every problem, including an
/// unknown name, comes back as an error envelope.
pub async fn call(name: &str, arguments: Value, ctx: ToolContext<'_>) -> ToolResult {
    tracing::debug!("Tool call: {name}");
    match name {
        connect::schema::NAME => connect::handler::handle(ctx, arguments).await,
        exec::schema::NAME => exec::handler::handle(ctx, arguments).await,
        disconnect::schema::NAME => disconnect::handler::handle(ctx),
        _ => {
            tracing::debug!("Unknown tool: {name}");
            ToolResult::error("Unknown tool")
        }
    }
}
