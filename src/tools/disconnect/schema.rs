use serde_json::json;

use crate::tools::ToolDescriptor;

pub const NAME: &str = "ssh_disconnect";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME,
        description: "Close SSH connection",
        input_schema: json!({"type": "object", "properties": {}}),
    }
}
