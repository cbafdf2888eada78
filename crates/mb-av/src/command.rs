//! Builder for executing external tool commands.
//!
//! There is no timeout: a cut or concat runs as long as the clip and disk
//! need. Operators who want a bound wrap the whole request externally.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

/// Maximum number of stderr bytes carried into an error message.
const STDERR_TAIL: usize = 2048;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use mb_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> mb_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-version")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// The command line as it would be typed in a shell, for logging.
    pub fn display(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// Stdin is closed so tools never block on an interactive prompt.
    ///
    /// # Errors
    ///
    /// - Returns [`mb_core::Error::Tool`] if spawning the process fails.
    /// - Returns [`mb_core::Error::Tool`] if the process exits with a non-zero
    ///   status (message includes the tail of stderr).
    pub async fn execute(&self) -> mb_core::Result<ToolOutput> {
        let program_name = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string());

        tracing::info!("Running command: {}", self.display());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|e| mb_core::Error::Tool {
            tool: program_name.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| mb_core::Error::Tool {
                tool: program_name.clone(),
                message: format!("I/O error waiting for process: {e}"),
            })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !tool_output.stderr.is_empty() {
            tracing::debug!("{program_name} stderr: {}", tool_output.stderr.trim());
        }

        if !output.status.success() {
            return Err(mb_core::Error::Tool {
                tool: program_name,
                message: format!(
                    "exited with status {}: {}",
                    output.status,
                    stderr_tail(&tool_output.stderr)
                ),
            });
        }

        Ok(tool_output)
    }
}

/// Last [`STDERR_TAIL`] bytes of stderr, cut on a char boundary.
fn stderr_tail(stderr: &str) -> &str {
    let trimmed = stderr.trim();
    if trimmed.len() <= STDERR_TAIL {
        return trimmed;
    }
    let mut start = trimmed.len() - STDERR_TAIL;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    &trimmed[start..]
}
