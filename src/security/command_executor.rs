//! SafeCommandExecutor: allow-listed command execution without a shell
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only pre-approved programs can execute
//! - **Injection prevention**: Arguments are passed as a vector, never interpolated
//!   into a shell string
//! - **Working directory validation**: Validates existence before execution
//! - **Timeout control**: Hanging processes are killed
//!
//! [`run_command`] is the logging wrapper every external command of the publisher
//! goes through.
//!
//! # Example
//!
//! ```rust,no_run
//! use types_publisher::{CommandRunner, SafeCommandExecutor};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut executor = SafeCommandExecutor::new(std::env::temp_dir())?;
//! executor.set_timeout(Duration::from_secs(30));
//!
//! let args = vec!["npm".to_string(), "--version".to_string()];
//! let output = executor.run(&args, None).await?;
//! println!("{}", output.stdout);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::core::error::PublishError;
use crate::core::logging::PublishLog;
use crate::core::traits::{CommandError, CommandOutput, CommandRunner};

/// Programs allowed unless the executor is told otherwise
const DEFAULT_ALLOWED_COMMANDS: &[&str] = &["npm"];

/// Allow-listed command executor
#[derive(Debug, Clone)]
pub struct SafeCommandExecutor {
    /// Directory commands run in when no explicit `cwd` is given
    working_dir: PathBuf,
    allowed_commands: Vec<String>,
    timeout: Option<Duration>,
}

impl SafeCommandExecutor {
    /// Create an executor running in `working_dir`, which must exist
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self {
            working_dir,
            allowed_commands: DEFAULT_ALLOWED_COMMANDS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            timeout: None,
        })
    }

    /// Add a program to the allow list
    pub fn allow(mut self, command: impl Into<String>) -> Self {
        self.allowed_commands.push(command.into());
        self
    }

    /// Commands exceeding this duration are killed
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn is_allowed(&self, command: &str) -> bool {
        self.allowed_commands.iter().any(|c| c == command)
    }

    fn program_name(command: &str) -> String {
        // npm and friends are .cmd shims on Windows
        #[cfg(target_os = "windows")]
        let name = if matches!(command, "npm" | "yarn" | "pnpm") {
            format!("{}.cmd", command)
        } else {
            command.to_string()
        };

        #[cfg(not(target_os = "windows"))]
        let name = command.to_string();

        name
    }
}

#[async_trait]
impl CommandRunner for SafeCommandExecutor {
    async fn run(&self, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput, CommandError> {
        let (command, rest) = args.split_first().ok_or(CommandError::EmptyCommand)?;

        if !self.is_allowed(command) {
            return Err(CommandError::CommandNotAllowed(command.clone()));
        }

        let working_dir = cwd.unwrap_or(&self.working_dir);
        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(
                working_dir.to_path_buf(),
            ));
        }

        let mut child = Command::new(Self::program_name(command));
        child
            .args(rest)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.output())
                .await
                .map_err(|_| CommandError::Timeout(timeout))?,
            None => child.output().await,
        }
        .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Run `args`, logging the command line and its outcome into `log`
///
/// In a dry run nothing is executed. Otherwise exactly one of two things happens:
/// stdout is logged and `Ok` returned, or the failure detail and stderr are logged
/// and a [`PublishError::CommandFailure`] carrying the stderr text is returned.
/// A command that cannot be started at all reports its start error as the stderr.
pub async fn run_command<R: CommandRunner + ?Sized>(
    runner: &R,
    description: &str,
    log: &mut PublishLog,
    dry_run: bool,
    args: &[String],
) -> Result<(), PublishError> {
    log.info(format!("Run {}", args.join(" ")));

    if dry_run {
        log.info("(dry run)");
        return Ok(());
    }

    let (detail, stderr) = match runner.run(args, None).await {
        Ok(output) if output.success() => {
            log.info("Ran successfully");
            log.info(output.stdout);
            return Ok(());
        }
        Ok(output) => {
            let detail = match output.status {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            };
            (detail, output.stderr)
        }
        Err(e) => (e.to_string(), e.to_string()),
    };

    log.error(format!("{} failed: {}", description, detail));
    log.info(format!("{} failed, refer to error log", description));
    log.error(stderr.clone());
    Err(PublishError::CommandFailure { stderr })
}
