//! `shell.run`: run the effective input through `sh -c`

use crate::config::{ShellConfig, StepDefinition};
use crate::workflow::{Action, ActionContext, ActionError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

/// Runs shell commands. Honors cancellation and a per-command timeout.
#[derive(Debug, Clone)]
pub struct ShellAction {
    command_wrapper: Option<String>,
    timeout: Duration,
}

impl ShellAction {
    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            command_wrapper: config.command_wrapper.clone(),
            timeout: Duration::from_secs(config.timeout()),
        }
    }

    pub fn new(timeout: Duration) -> Self {
        Self {
            command_wrapper: None,
            timeout,
        }
    }

    /// Apply the configured wrapper, if any
    fn wrap(&self, command: &str) -> String {
        match &self.command_wrapper {
            Some(wrapper) => format!("{} {}", wrapper, shell_quote(command)),
            None => command.to_string(),
        }
    }
}

#[async_trait]
impl Action for ShellAction {
    async fn call(
        &self,
        ctx: &ActionContext,
        step: &StepDefinition,
        input: &str,
    ) -> Result<String, ActionError> {
        let command = input.trim();
        if command.is_empty() {
            return Err(ActionError::missing_field("input"));
        }
        ctx.check_cancelled()?;

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(self.wrap(command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = step.option("dir") {
            cmd.current_dir(shellexpand::tilde(dir).as_ref());
        }

        let child = cmd
            .spawn()
            .map_err(|e| ActionError::failed(format!("failed to spawn: {}", e)))?;

        let start = Instant::now();
        // Dropping the wait future kills the child
        let output = tokio::select! {
            out = tokio::time::timeout(self.timeout, child.wait_with_output()) => match out {
                Ok(out) => out?,
                Err(_) => return Err(ActionError::Timeout { elapsed: start.elapsed() }),
            },
            _ = ctx.cancel.cancelled() => return Err(ActionError::Cancelled),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() {
            tracing::debug!(step = %step.id, bytes = stdout.len(), "Shell command succeeded");
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("command exited with code {:?}", exit_code(&output.status))
        } else {
            stderr
        };
        Err(ActionError::failed(message))
    }
}

/// Exit code, using 128+signal for signal-terminated processes on Unix
fn exit_code(status: &std::process::ExitStatus) -> Option<i32> {
    if let Some(code) = status.code() {
        return Some(code);
    }
    #[cfg(unix)]
    {
        if let Some(signal) = status.signal() {
            return Some(128 + signal);
        }
    }
    None
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::workflow::CancellationToken;

    fn ctx() -> ActionContext {
        ActionContext::new("test", CancellationToken::new())
    }

    fn step() -> StepDefinition {
        StepDefinition::new("sh", "shell.run")
    }

    #[tokio::test]
    async fn test_runs_command() {
        let action = ShellAction::new(Duration::from_secs(10));
        let out = action.call(&ctx(), &step(), "echo 'hello world'").await.unwrap();
        assert_eq!(out, "hello world");
    }

    #[tokio::test]
    async fn test_failure_uses_stderr() {
        let action = ShellAction::new(Duration::from_secs(10));
        let err = action
            .call(&ctx(), &step(), "echo broken >&2; exit 3")
            .await
            .unwrap_err();
        assert_eq!(err, ActionError::failed("broken"));
    }

    #[tokio::test]
    async fn test_failure_without_stderr_reports_code() {
        let action = ShellAction::new(Duration::from_secs(10));
        let err = action.call(&ctx(), &step(), "exit 42").await.unwrap_err();
        assert!(err.to_string().contains("42"));
    }

    #[tokio::test]
    async fn test_empty_command() {
        let action = ShellAction::new(Duration::from_secs(10));
        let err = action.call(&ctx(), &step(), "   ").await.unwrap_err();
        assert!(matches!(err, ActionError::MissingField { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let action = ShellAction::new(Duration::from_millis(50));
        let err = action.call(&ctx(), &step(), "sleep 5").await.unwrap_err();
        assert!(matches!(err, ActionError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_cancellation() {
        let action = ShellAction::new(Duration::from_secs(30));
        let ctx = ctx();
        let cancel = ctx.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let err = action.call(&ctx, &step(), "sleep 5").await.unwrap_err();
        assert_eq!(err, ActionError::Cancelled);
    }

    #[tokio::test]
    async fn test_dir_option() {
        let dir = tempfile::TempDir::new().unwrap();
        let step = step().with_option("dir", dir.path().to_str().unwrap());
        let action = ShellAction::new(Duration::from_secs(10));

        let out = action.call(&ctx(), &step, "pwd").await.unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(std::path::Path::new(&out).canonicalize().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_command_wrapper() {
        let config = ShellConfig {
            enabled: Some(true),
            command_wrapper: Some("sh -c".into()),
            timeout: Some(10),
        };
        let action = ShellAction::from_config(&config);
        let out = action.call(&ctx(), &step(), "echo 'it''s wrapped'").await.unwrap();
        assert_eq!(out, "its wrapped");
    }

    #[test]
    fn test_exit_code_passthrough() {
        let status = std::process::ExitStatus::from_raw(42 << 8);
        assert_eq!(exit_code(&status), Some(42));

        // SIGKILL (9) -> 128 + 9 = 137
        let status = std::process::ExitStatus::from_raw(9);
        assert_eq!(exit_code(&status), Some(137));
    }
}
