use std::fmt::Write;

use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;

use crate::config::ServerConfig;

use super::process::{is_installed, run_with_timeout};
use super::ssh::SshOptions;
use super::strategy::PasswordStrategy;
use super::{ExecOutcome, ExecOutput, RemoteRequest};

pub(super) const NAME: &str = "expect";

/// Environment variable the script reads the password from.
const PASSWORD_ENV: &str = "MCP_SSH_PASSWORD";

const EXIT_WITH_SSH_STATUS: &str = "catch wait result; exit [lindex $result 3]";

/// Largest chunk held while waiting for the prompt before it is flushed.
const MATCH_MAX: usize = 65536;

/// Drives ssh through an `expect` script that answers the password prompt.
///
/// Used where sshpass is not installed. ssh runs on a pty here, so its
/// stderr arrives interleaved with stdout.
pub struct ExpectStrategy {
    program: String,
    ssh: SshOptions,
}

impl ExpectStrategy {
    pub fn new(program: impl Into<String>, ssh: SshOptions) -> Self {
        Self {
            program: program.into(),
            ssh,
        }
    }

    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.expect_program.clone(), SshOptions::from_config(config))
    }

    /// ssh line to spawn. ssh gets a single password attempt, so a rejected
    /// password ends the session instead of prompting again.
    fn spawn_line(&self, request: &RemoteRequest) -> Vec<String> {
        let mut line = vec![
            self.ssh.program.clone(),
            "-o".to_string(),
            "NumberOfPasswordPrompts=1".to_string(),
        ];
        line.extend(self.ssh.args(request));
        line
    }

    /// Answers the first password prompt, then passes everything through
    /// untouched until ssh exits. Output seen before the prompt, or instead
    /// of it, is echoed as well.
    fn script(&self, request: &RemoteRequest) -> String {
        let spawn = self
            .spawn_line(request)
            .iter()
            .map(|arg| tcl_word(arg))
            .collect::<Vec<_>>()
            .join(" ");

        let mut script = String::new();
        let _ = writeln!(script, "log_user 0");
        let _ = writeln!(script, "set timeout -1");
        let _ = writeln!(script, "match_max {MATCH_MAX}");
        let _ = writeln!(script, "spawn -noecho {spawn}");
        let _ = writeln!(script, "expect {{");
        let _ = writeln!(script, "    -nocase -re {{password[^\\n]*:}} {{");
        let _ = writeln!(script, "        send -- \"$env({PASSWORD_ENV})\\r\"");
        let _ = writeln!(script, "    }}");
        let _ = writeln!(script, "    full_buffer {{");
        let _ = writeln!(script, "        puts -nonewline $expect_out(buffer)");
        let _ = writeln!(script, "        exp_continue");
        let _ = writeln!(script, "    }}");
        let _ = writeln!(script, "    eof {{");
        let _ = writeln!(script, "        puts -nonewline $expect_out(buffer)");
        let _ = writeln!(script, "        {EXIT_WITH_SSH_STATUS}");
        let _ = writeln!(script, "    }}");
        let _ = writeln!(script, "}}");
        let _ = writeln!(script, "log_user 1");
        let _ = writeln!(script, "expect eof");
        let _ = writeln!(script, "{EXIT_WITH_SSH_STATUS}");
        script
    }

    fn command(&self, request: &RemoteRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-c")
            .arg(self.script(request))
            .env(PASSWORD_ENV, &request.credentials.password);
        command
    }
}

#[async_trait]
impl PasswordStrategy for ExpectStrategy {
    async fn run(&self, request: &RemoteRequest) -> Result<ExecOutcome> {
        let outcome = run_with_timeout(NAME, self.command(request), request.timeout).await?;
        Ok(match outcome {
            ExecOutcome::Completed(output) => ExecOutcome::Completed(normalize_pty_output(output)),
            other => other,
        })
    }

    async fn is_installed(&self) -> bool {
        is_installed(&self.program, "-v").await
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

pub(super) fn describe_exit_status(code: i32) -> Option<&'static str> {
    match code {
        255 => Some("ssh failed to connect or authenticate"),
        _ => None,
    }
}

/// Quote `s` as a single Tcl word by escaping every special character.
fn tcl_word(s: &str) -> String {
    if s.is_empty() {
        return "{}".to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' | '{' | '}' | '[' | ']' | '$' | '"' | ';' | ' ' | '\t' | '#' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// pty output uses CRLF and starts with the newline echoed after the
/// password was sent.
fn normalize_pty_output(mut output: ExecOutput) -> ExecOutput {
    let stdout = output.stdout.replace("\r\n", "\n");
    output.stdout = stdout.strip_prefix('\n').map(str::to_string).unwrap_or(stdout);
    output
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::session::SessionCredentials;

    fn request(command: &str) -> RemoteRequest {
        RemoteRequest {
            credentials: SessionCredentials {
                host: "example.com".to_string(),
                port: 22,
                username: "admin".to_string(),
                password: "s3cr3t$".to_string(),
            },
            command: command.to_string(),
            connect_timeout: Some(Duration::from_secs(10)),
            timeout: Duration::from_secs(15),
        }
    }

    #[test]
    fn tcl_word_escapes_specials() {
        assert_eq!(tcl_word("plain"), "plain");
        assert_eq!(tcl_word(""), "{}");
        assert_eq!(tcl_word("echo $HOME"), "echo\\ \\$HOME");
        assert_eq!(tcl_word("a;[b]{c}"), "a\\;\\[b\\]\\{c\\}");
        assert_eq!(tcl_word("line\nnext"), "line\\nnext");
        assert_eq!(tcl_word(r#"say "hi""#), r#"say\ \"hi\""#);
    }

    #[test]
    fn script_spawns_quoted_ssh_and_reads_password_from_env() {
        let strategy = ExpectStrategy::from_config(&ServerConfig::default());
        let script = strategy.script(&request("ls -la /tmp"));

        assert!(script.contains(
            "spawn -noecho ssh -o NumberOfPasswordPrompts=1 -o StrictHostKeyChecking=no \
             -o ConnectTimeout=10 -p 22 -- admin@example.com ls\\ -la\\ /tmp"
        ));
        assert!(script.contains("$env(MCP_SSH_PASSWORD)"));
        assert!(!script.contains("s3cr3t"));
    }

    #[test]
    fn script_answers_only_the_first_prompt() {
        let strategy = ExpectStrategy::from_config(&ServerConfig::default());
        let script = strategy.script(&request("grep password: app.conf"));
        let lines: Vec<&str> = script.lines().map(str::trim).collect();

        let prompt = lines
            .iter()
            .position(|l| l.starts_with("-nocase -re {password"))
            .unwrap();
        let passthrough = lines.iter().position(|l| *l == "log_user 1").unwrap();
        assert!(prompt < passthrough);
        assert_eq!(lines[passthrough + 1], "expect eof");

        // one prompt arm, no looping back into it, no custom exit codes
        assert_eq!(script.matches("password[^\\n]*:").count(), 1);
        assert_eq!(script.matches("exp_continue").count(), 1);
        let full_buffer = lines.iter().position(|l| *l == "full_buffer {").unwrap();
        assert_eq!(lines[full_buffer + 2], "exp_continue");
        assert!(!script.contains("exit 5"));
        assert!(script.ends_with("expect eof\ncatch wait result; exit [lindex $result 3]\n"));
    }

    #[test]
    fn script_echoes_output_when_no_prompt_arrives() {
        let strategy = ExpectStrategy::from_config(&ServerConfig::default());
        let script = strategy.script(&request("true"));
        let lines: Vec<&str> = script.lines().map(str::trim).collect();

        let eof = lines.iter().position(|l| *l == "eof {").unwrap();
        assert_eq!(lines[eof + 1], "puts -nonewline $expect_out(buffer)");
        assert_eq!(lines[eof + 2], EXIT_WITH_SSH_STATUS);
        assert!(script.contains("match_max 65536"));
    }

    #[test]
    fn command_passes_password_in_environment() {
        let strategy = ExpectStrategy::from_config(&ServerConfig::default());
        let command = strategy.command(&request("true"));
        let password = command
            .as_std()
            .get_envs()
            .find(|(key, _)| *key == PASSWORD_ENV)
            .and_then(|(_, value)| value);
        assert_eq!(password, Some(std::ffi::OsStr::new("s3cr3t$")));
    }

    #[test]
    fn pty_output_is_normalized() {
        let output = normalize_pty_output(ExecOutput {
            strategy: NAME,
            exit_code: 0,
            stdout: "\r\nfile1\r\nfile2\r\n".to_string(),
            stderr: String::new(),
        });
        assert_eq!(output.stdout, "file1\nfile2\n");
    }

    #[tokio::test]
    async fn missing_helper_is_unavailable() {
        let strategy = ExpectStrategy::new("no-such-expect-binary-71b0", SshOptions::default());
        let outcome = strategy.run(&request("true")).await.unwrap();
        assert_eq!(outcome, ExecOutcome::Unavailable);
    }
}
