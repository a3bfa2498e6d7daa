use serde::Deserialize;
use serde_json::json;

use crate::error::ToolError;
use crate::session::SessionCredentials;
use crate::tools::ToolDescriptor;

pub const NAME: &str = "ssh_connect";

const DEFAULT_PORT: u16 = 22;

#[derive(Debug, Deserialize)]
pub struct ConnectInput {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
}

impl ConnectInput {
    /// Reject values ssh would read as options instead of a destination.
    pub fn into_credentials(self) -> Result<SessionCredentials, ToolError> {
        check_destination_part("host", &self.host)?;
        check_destination_part("username", &self.username)?;
        Ok(SessionCredentials {
            host: self.host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            username: self.username,
            password: self.password,
        })
    }
}

fn check_destination_part(field: &str, value: &str) -> Result<(), ToolError> {
    if value.is_empty() {
        return Err(ToolError::Validation(format!("{field} must not be empty")));
    }
    if value.starts_with('-') {
        return Err(ToolError::Validation(format!("{field} must not start with '-'")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ToolError::Validation(format!("{field} must not contain whitespace")));
    }
    Ok(())
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME,
        description: "Connect to SSH server",
        input_schema: json!({
            "type": "object",
            "properties": {
                "host": {"type": "string", "description": "SSH server address"},
                "port": {"type": "number", "description": "SSH port (default: 22)", "default": DEFAULT_PORT},
                "username": {"type": "string", "description": "Username"},
                "password": {"type": "string", "description": "Password"}
            },
            "required": ["host", "username", "password"]
        }),
    }
}
