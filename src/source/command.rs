//! Provider invocation: an external command that emits a usage document.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::runtime::Runtime;

use crate::data::UsageSnapshot;

/// Default provider invocation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from a provider invocation.
///
/// All variants are recovered locally by falling back to synthetic data;
/// none is fatal to the dashboard.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The provider did not finish within the timeout.
    #[error("provider timed out")]
    Timeout,

    /// The provider emitted something that is not a JSON document.
    #[error("malformed provider output: {0}")]
    Malformed(String),

    /// The provider executable could not be found.
    #[error("provider executable not found: {0}")]
    ProviderMissing(String),

    /// The provider ran but exited with a failure.
    #[error("provider failed: {0}")]
    ProviderFailed(String),
}

/// A source of raw usage documents.
///
/// The dashboard only ever sees this seam; tests substitute scripted
/// implementations for the real command invocation.
pub trait Provider: Send {
    /// Invoke the provider once and parse its output.
    fn invoke(&mut self) -> Result<UsageSnapshot, SourceError>;

    /// Human-readable description for the status bar.
    fn describe(&self) -> &str;
}

/// Invokes an external command and parses its stdout as a usage document.
///
/// The command runs under a bounded timeout on a private current-thread
/// runtime; the caller blocks for at most the timeout.
pub struct CommandProvider {
    argv: Vec<String>,
    timeout: Duration,
    description: String,
    runtime: Runtime,
}

impl std::fmt::Debug for CommandProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandProvider")
            .field("argv", &self.argv)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CommandProvider {
    /// Create a provider for the given argv. Empty argv is treated as a
    /// missing executable on invocation rather than an error here.
    pub fn new(argv: Vec<String>, timeout: Duration) -> anyhow::Result<Self> {
        let description = format!("command: {}", argv.join(" "));
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            argv,
            timeout,
            description,
            runtime,
        })
    }

    async fn run(argv: &[String], timeout: Duration) -> Result<UsageSnapshot, SourceError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(SourceError::ProviderMissing("<empty command>".to_string()));
        };

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(timeout, child).await {
            Err(_) => return Err(SourceError::Timeout),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::ProviderMissing(program.clone()));
            }
            Ok(Err(e)) => return Err(SourceError::ProviderFailed(e.to_string())),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(SourceError::ProviderFailed(format!(
                "exit status {}",
                output.status
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

impl Provider for CommandProvider {
    fn invoke(&mut self) -> Result<UsageSnapshot, SourceError> {
        self.runtime.block_on(Self::run(&self.argv, self.timeout))
    }

    fn describe(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(argv: &[&str]) -> CommandProvider {
        CommandProvider::new(
            argv.iter().map(|s| s.to_string()).collect(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_executable() {
        let mut p = provider(&["spendwatch-no-such-binary"]);
        assert!(matches!(p.invoke(), Err(SourceError::ProviderMissing(_))));
    }

    #[test]
    fn test_empty_argv_is_missing() {
        let mut p = provider(&[]);
        assert!(matches!(p.invoke(), Err(SourceError::ProviderMissing(_))));
    }

    #[test]
    fn test_malformed_output() {
        let mut p = provider(&["echo", "not json"]);
        assert!(matches!(p.invoke(), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn test_nonzero_exit() {
        let mut p = provider(&["false"]);
        assert!(matches!(p.invoke(), Err(SourceError::ProviderFailed(_))));
    }

    #[test]
    fn test_valid_document() {
        let mut p = provider(&["echo", r#"{"total_cost": 1.5, "total_tokens": 2000}"#]);
        let snap = p.invoke().unwrap();
        assert_eq!(snap.total_cost, 1.5);
        assert_eq!(snap.total_tokens, 2000.0);
    }

    #[test]
    fn test_describe() {
        let p = provider(&["usage", "--json"]);
        assert_eq!(p.describe(), "command: usage --json");
    }
}
