use std::any::Any;
use std::panic::AssertUnwindSafe;

use anyhow::{Context, Result};
use futures::FutureExt;
use serde_json::{json, Value};
use tokio::io::{stdin, stdout, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::ServerConfig;
use crate::exec::{RemoteRunner, StrategySelector};
use crate::protocol::{
    initialize_result, CallParams, JsonRpcRequest, JsonRpcResponse, RpcFault, METHOD_INITIALIZE,
    METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};
use crate::session::Session;
use crate::tools::{self, ToolContext};

/// MCP server for a single SSH session, speaking line-delimited JSON-RPC.
///
/// Requests are handled one at a time in the order they arrive. The
/// server owns the [`Session`] and lends it to each tool call.
pub struct McpServer {
    session: Session,
    runner: Box<dyn RemoteRunner>,
    config: ServerConfig,
}

impl McpServer {
    /// Server backed by the password helpers listed in `config`.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let runner = Box::new(StrategySelector::from_config(&config));
        Self::with_runner(config, runner)
    }

    #[must_use]
    pub fn with_runner(config: ServerConfig, runner: Box<dyn RemoteRunner>) -> Self {
        Self {
            session: Session::new(),
            runner,
            config,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the MCP server on stdio until stdin closes.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read or stdout cannot be written.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!("Starting MCP server on stdio");
        self.serve(BufReader::new(stdin()), stdout()).await?;
        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Read requests from `reader` until end of stream, writing one response
    /// line per answered request to `writer`.
    ///
    /// # Errors
    ///
    /// Only I/O failures on the streams end the loop early. Bad requests
    /// never do.
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .await
                .context("Failed to read request")?;
            if read == 0 {
                return Ok(());
            }

            if let Some(response) = self.handle_line(&line).await {
                write_response(&mut writer, &response).await?;
            }
        }
    }

    /// Handle one input line. `None` means nothing should be written back:
    /// blank or malformed lines, and methods this server does not answer.
    pub async fn handle_line(&mut self, line: &[u8]) -> Option<JsonRpcResponse> {
        let Ok(text) = std::str::from_utf8(line) else {
            tracing::debug!("Discarding line that is not UTF-8");
            return None;
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Discarding malformed request: {e}");
                return None;
            }
        };

        let request = match JsonRpcRequest::from_value(&value) {
            Ok(request) => request,
            Err(fault) => {
                tracing::warn!("Rejecting request: {fault}");
                return Some(JsonRpcResponse::error(Value::Null, fault.to_string()));
            }
        };
        let id = request.id.clone();

        let handled = AssertUnwindSafe(self.handle_request(request))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(RpcFault::Panic(panic_message(&*panic))));

        match handled {
            Ok(Some(result)) => Some(JsonRpcResponse::result(id, result)),
            Ok(None) => None,
            Err(fault) => {
                tracing::error!("Request {id} failed: {fault}");
                Some(JsonRpcResponse::error(id, fault.to_string()))
            }
        }
    }

    async fn handle_request(
        &mut self,
        request: JsonRpcRequest<'_>,
    ) -> Result<Option<Value>, RpcFault> {
        match request.method {
            Some(METHOD_INITIALIZE) => {
                tracing::info!("Client initialized session");
                Ok(Some(initialize_result()))
            }
            Some(METHOD_TOOLS_LIST) => Ok(Some(json!({ "tools": tools::descriptors() }))),
            Some(METHOD_TOOLS_CALL) => {
                let call = CallParams::from_params(request.params)?;
                let ctx = ToolContext {
                    session: &mut self.session,
                    runner: self.runner.as_ref(),
                    config: &self.config,
                };
                let result = tools::call(&call.name, call.arguments, ctx).await;
                Ok(Some(serde_json::to_value(result)?))
            }
            other => {
                tracing::debug!("Ignoring method {other:?}");
                Ok(None)
            }
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut encoded = serde_json::to_vec(response).context("Failed to encode response")?;
    encoded.push(b'\n');
    writer
        .write_all(&encoded)
        .await
        .context("Failed to write response")?;
    // The peer reads line by line, so nothing may sit in a buffer.
    writer.flush().await.context("Failed to flush response")?;
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}
