use crate::config::ServerConfig;

use super::RemoteRequest;

/// How to invoke the `ssh` client itself, shared by every password helper.
#[derive(Debug, Clone)]
pub struct SshOptions {
    pub program: String,
    pub strict_host_key_checking: bool,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

impl SshOptions {
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            program: config.ssh_program.clone(),
            strict_host_key_checking: config.strict_host_key_checking,
        }
    }

    /// Arguments for `ssh`, not including the program name.
    ///
    /// Options end at `--`, so a command starting with `-` is never read
    /// as one by ssh.
    #[must_use]
    pub fn args(&self, request: &RemoteRequest) -> Vec<String> {
        let strict = if self.strict_host_key_checking { "yes" } else { "no" };
        let mut args = vec!["-o".to_string(), format!("StrictHostKeyChecking={strict}")];

        if let Some(timeout) = request.connect_timeout {
            args.push("-o".to_string());
            args.push(format!("ConnectTimeout={}", timeout.as_secs().max(1)));
        }

        args.push("-p".to_string());
        args.push(request.credentials.port.to_string());
        args.push("--".to_string());
        args.push(request.credentials.destination());
        args.push(request.command.clone());
        args
    }

    /// `ssh` followed by [`Self::args`].
    #[must_use]
    pub fn command_line(&self, request: &RemoteRequest) -> Vec<String> {
        let mut line = vec![self.program.clone()];
        line.extend(self.args(request));
        line
    }
}
