use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;

use crate::config::ServerConfig;

use super::process::{is_installed, run_with_timeout};
use super::ssh::SshOptions;
use super::strategy::PasswordStrategy;
use super::{ExecOutcome, RemoteRequest};

pub(super) const NAME: &str = "sshpass";

/// Runs `sshpass -e ssh ...`, handing over the password in the `SSHPASS`
/// environment variable so it never shows up in the process list.
pub struct SshpassStrategy {
    program: String,
    ssh: SshOptions,
}

impl SshpassStrategy {
    pub fn new(program: impl Into<String>, ssh: SshOptions) -> Self {
        Self {
            program: program.into(),
            ssh,
        }
    }

    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.sshpass_program.clone(), SshOptions::from_config(config))
    }

    fn command(&self, request: &RemoteRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-e")
            .args(self.ssh.command_line(request))
            .env("SSHPASS", &request.credentials.password);
        command
    }
}

#[async_trait]
impl PasswordStrategy for SshpassStrategy {
    async fn run(&self, request: &RemoteRequest) -> Result<ExecOutcome> {
        run_with_timeout(NAME, self.command(request), request.timeout).await
    }

    async fn is_installed(&self) -> bool {
        is_installed(&self.program, "-V").await
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

/// sshpass reserves exit statuses 1-6 for its own failures.
pub(super) fn describe_exit_status(code: i32) -> Option<&'static str> {
    match code {
        1 => Some("sshpass: invalid command line argument"),
        2 => Some("sshpass: conflicting arguments given"),
        3 => Some("sshpass: general runtime error"),
        4 => Some("unrecognized response from ssh"),
        5 => Some("invalid or incorrect password"),
        6 => Some("host public key is unknown"),
        255 => Some("ssh failed to connect"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::session::SessionCredentials;

    fn request() -> RemoteRequest {
        RemoteRequest {
            credentials: SessionCredentials {
                host: "example.com".to_string(),
                port: 22,
                username: "root".to_string(),
                password: "pa ss".to_string(),
            },
            command: "true".to_string(),
            connect_timeout: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn password_goes_through_environment() {
        let strategy = SshpassStrategy::from_config(&ServerConfig::default());
        let command = strategy.command(&request());
        let std_command = command.as_std();

        let args: Vec<_> = std_command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "-e");
        assert_eq!(args[1], "ssh");
        assert!(!args.iter().any(|a| a.contains("pa ss")));

        let password = std_command
            .get_envs()
            .find(|(key, _)| *key == "SSHPASS")
            .and_then(|(_, value)| value);
        assert_eq!(password, Some(std::ffi::OsStr::new("pa ss")));
    }

    #[tokio::test]
    async fn missing_helper_is_unavailable() {
        let strategy =
            SshpassStrategy::new("no-such-sshpass-binary-9a2e", SshOptions::default());
        let outcome = strategy.run(&request()).await.unwrap();
        assert_eq!(outcome, ExecOutcome::Unavailable);
        assert!(!strategy.is_installed().await);
    }

    #[test]
    fn known_statuses() {
        assert_eq!(describe_exit_status(5), Some("invalid or incorrect password"));
        assert_eq!(describe_exit_status(42), None);
    }
}
