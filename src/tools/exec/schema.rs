use serde::Deserialize;
use serde_json::json;

use crate::tools::ToolDescriptor;

pub const NAME: &str = "ssh_exec";

#[derive(Debug, Deserialize)]
pub struct ExecInput {
    pub command: String,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME,
        description: "Execute command over SSH",
        input_schema: json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "description": "Command to execute"}
            },
            "required": ["command"]
        }),
    }
}
