//! Bounded invocations of the docker CLI.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::{ComposeError, ComposeResult};

/// Environment variable overriding the docker command.
pub const DOCKER_ENV: &str = "RESCALE_DOCKER";

/// A docker command line plus the timeout applied to each invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCli {
    program: String,
    /// Arguments placed before every call, e.g. `docker` in `sudo docker`.
    leading_args: Vec<String>,
    timeout: Duration,
}

impl DockerCli {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Build from a command string such as `docker` or `sudo -n docker`.
    ///
    /// Whitespace separates the program from its leading arguments. An
    /// empty string falls back to `docker`.
    pub fn new(command: &str, timeout: Duration) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_else(|| "docker".to_string());
        Self {
            program,
            leading_args: words.collect(),
            timeout,
        }
    }

    /// Resolve the docker command.
    ///
    /// Search order:
    /// 1. explicit `command` (CLI flag or rescale.toml)
    /// 2. `$RESCALE_DOCKER`
    /// 3. `docker` on `$PATH`
    pub fn resolve(command: Option<&str>, timeout: Duration) -> Self {
        if let Some(command) = command {
            return Self::new(command, timeout);
        }
        if let Ok(command) = std::env::var(DOCKER_ENV)
            && !command.trim().is_empty()
        {
            debug!(%command, env = DOCKER_ENV, "docker command from environment");
            return Self::new(&command, timeout);
        }
        Self::new("docker", timeout)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run with `args` under the default timeout and return stdout.
    pub async fn run(&self, args: &[String]) -> ComposeResult<String> {
        self.run_with_timeout(args, self.timeout).await
    }

    /// Run with `args` and return stdout.
    ///
    /// A non-zero exit becomes [`ComposeError::Failed`] carrying stderr; an
    /// invocation exceeding `timeout` is killed.
    pub async fn run_with_timeout(&self, args: &[String], timeout: Duration) -> ComposeResult<String> {
        let rendered = self.render(args);
        debug!(command = %rendered, "running");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Keep terminal interrupts away from in-flight docker calls.
        #[cfg(unix)]
        cmd.process_group(0);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ComposeError::Spawn {
                    program: self.program.clone(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ComposeError::Timeout {
                    command: rendered,
                    timeout,
                });
            }
        };

        if !output.status.success() {
            return Err(ComposeError::Failed {
                command: rendered,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn render(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.leading_args.iter().map(String::as_str))
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker", Self::DEFAULT_TIMEOUT)
    }
}
