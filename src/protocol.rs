//! JSON-RPC 2.0 wire types for the line-delimited MCP transport.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "mcp-ssh-server";

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// A request that parsed as JSON but could not be handled. Sent back to
/// the peer as a JSON-RPC `error` object.
#[derive(Debug, Error)]
pub enum RpcFault {
    #[error("request must be a JSON object")]
    NotAnObject,

    #[error("params must be an object")]
    InvalidParams,

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Panic(String),
}

/// Borrowed view of an incoming request.
#[derive(Debug)]
pub struct JsonRpcRequest<'a> {
    pub id: Value,
    pub method: Option<&'a str>,
    pub params: Option<&'a Value>,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn from_value(value: &'a Value) -> Result<Self, RpcFault> {
        let object = value.as_object().ok_or(RpcFault::NotAnObject)?;
        Ok(Self {
            id: object.get("id").cloned().unwrap_or(Value::Null),
            method: object.get("method").and_then(Value::as_str),
            params: object.get("params"),
        })
    }
}

/// `params` of a `tools/call` request.
#[derive(Debug, PartialEq)]
pub struct CallParams {
    /// Empty when missing, which dispatches as an unknown tool.
    pub name: String,
    pub arguments: Value,
}

impl CallParams {
    pub fn from_params(params: Option<&Value>) -> Result<Self, RpcFault> {
        let params = match params {
            None | Some(Value::Null) => return Ok(Self::empty()),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(RpcFault::InvalidParams),
        };

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(arguments) => arguments.clone(),
        };
        Ok(Self { name, arguments })
    }

    fn empty() -> Self {
        Self {
            name: String::new(),
            arguments: Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub message: String,
}

impl JsonRpcResponse {
    #[must_use]
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(RpcErrorBody {
                message: message.into(),
            }),
        }
    }
}

/// Result of `initialize`.
#[must_use]
pub fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {"tools": {}},
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_id_gets_null() {
        let value = json!({"jsonrpc": "2.0", "method": "tools/list"});
        let request = JsonRpcRequest::from_value(&value).unwrap();
        assert_eq!(request.id, Value::Null);
        assert_eq!(request.method, Some("tools/list"));
    }

    #[test]
    fn request_keeps_string_id() {
        let value = json!({"jsonrpc": "2.0", "id": "abc-1", "method": "initialize"});
        let request = JsonRpcRequest::from_value(&value).unwrap();
        assert_eq!(request.id, json!("abc-1"));
    }

    #[test]
    fn non_object_request_is_a_fault() {
        let value = json!([1, 2, 3]);
        assert!(matches!(
            JsonRpcRequest::from_value(&value),
            Err(RpcFault::NotAnObject)
        ));
    }

    #[test]
    fn call_params_default_arguments() {
        let params = json!({"name": "ssh_disconnect"});
        let call = CallParams::from_params(Some(&params)).unwrap();
        assert_eq!(call.name, "ssh_disconnect");
        assert_eq!(call.arguments, json!({}));

        let params = json!({"name": "ssh_disconnect", "arguments": null});
        let call = CallParams::from_params(Some(&params)).unwrap();
        assert_eq!(call.arguments, json!({}));
    }

    #[test]
    fn call_params_missing_is_unknown_tool() {
        let call = CallParams::from_params(None).unwrap();
        assert_eq!(call.name, "");
        assert_eq!(call.arguments, json!({}));
    }

    #[test]
    fn call_params_must_be_object() {
        let params = json!("ssh_exec");
        assert!(matches!(
            CallParams::from_params(Some(&params)),
            Err(RpcFault::InvalidParams)
        ));
    }

    #[test]
    fn error_response_omits_result() {
        let response = JsonRpcResponse::error(Value::Null, "boom");
        let encoded = serde_json::to_string(&response).unwrap();
        assert_eq!(
            encoded,
            r#"{"jsonrpc":"2.0","id":null,"error":{"message":"boom"}}"#
        );
    }

    #[test]
    fn initialize_announces_server() {
        let result = initialize_result();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "mcp-ssh-server");
        assert!(result["capabilities"]["tools"].is_object());
    }
}
