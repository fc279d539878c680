//! Core traits and types for types publishing
//!
//! This module defines the two capability seams of the publisher: the registry
//! client that publishes, tags and deprecates packages, and the command runner that
//! executes external processes. The orchestrator only ever talks to these traits, so
//! it can be driven by fakes in tests.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::packages::manifest::PackageManifest;

// ============================================================================
// Registry Client
// ============================================================================

/// Registry operations the publisher depends on
///
/// Every failure is surfaced to the caller unchanged; the orchestrator wraps the
/// error text into a registry error without retrying.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Publish the package in `package_dir`
    ///
    /// When `dry_run` is true the client must simulate without touching remote state.
    async fn publish(
        &self,
        package_dir: &Path,
        manifest: &PackageManifest,
        dry_run: bool,
    ) -> anyhow::Result<()>;

    /// Point distribution tag `tag` at `package_name@version`
    async fn tag(&self, package_name: &str, version: &str, tag: &str) -> anyhow::Result<()>;

    /// Mark `full_name@version` as deprecated with a single-line `message`
    async fn deprecate(&self, full_name: &str, version: &str, message: &str)
    -> anyhow::Result<()>;
}

// ============================================================================
// Command Runner
// ============================================================================

/// Captured result of an external process that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Errors that prevent a command from running to completion
#[derive(Error, Debug)]
pub enum CommandError {
    /// Empty argument vector
    #[error("No command given")]
    EmptyCommand,

    /// Command is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {}", .0.display())]
    InvalidWorkingDirectory(std::path::PathBuf),

    /// Binary not found, permission denied, etc.
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// Command exceeded the timeout duration
    #[error("Command timeout after {0:?}")]
    Timeout(std::time::Duration),
}

/// Executes an argument vector (`args[0]` is the program)
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion, in `cwd` when given
    async fn run(&self, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput, CommandError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_success() {
        let output = CommandOutput {
            status: Some(0),
            stdout: "ok".to_string(),
            stderr: String::new(),
        };
        assert!(output.success());
    }

    #[test]
    fn test_command_output_failure() {
        let exited = CommandOutput {
            status: Some(1),
            stdout: String::new(),
            stderr: "npm ERR!".to_string(),
        };
        let signalled = CommandOutput {
            status: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(!exited.success());
        assert!(!signalled.success());
    }

    #[test]
    fn test_command_error_display() {
        let error = CommandError::CommandNotAllowed("rm".to_string());
        assert_eq!(error.to_string(), "Command 'rm' is not in the allowed whitelist");
    }
}
