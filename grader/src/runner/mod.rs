//! Runner module - Execution abstraction layer
//!
//! All process execution goes through the [`Runner`] trait, so the isolation
//! boundary can be swapped (plain subprocess today; a container or micro-VM
//! later) without the grader noticing.
//!
//! The runner module does NOT:
//! - Compare outputs or determine verdicts
//! - Know about languages or compilation
//! - Manage workspaces

pub mod sandboxed;

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use sandboxed::SandboxedRunner;

/// A program invocation: what to exec and where
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: None,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Split a configured command line: program first, then its arguments
    pub fn from_vec(cmd: &[String]) -> Self {
        match cmd.split_first() {
            Some((program, args)) => Self::new(program.as_str()).with_args(args.iter().cloned()),
            None => Self::new(""),
        }
    }

    /// Program to spawn; `./name` is taken relative to the working directory
    pub fn resolved_program(&self) -> PathBuf {
        match (&self.work_dir, self.program.strip_prefix("./")) {
            (Some(dir), Some(relative)) => dir.join(relative),
            _ => PathBuf::from(&self.program),
        }
    }
}

/// Bytes kept from each of stdout and stderr unless overridden
pub const DEFAULT_OUTPUT_LIMIT_BYTES: u64 = 16 * 1024 * 1024;

/// Bounds for one execution
#[derive(Debug, Clone, PartialEq)]
pub struct RunLimits {
    pub wall_time_ms: u64,
    /// Address-space ceiling in MB; `None` leaves memory unbounded
    pub address_space_mb: Option<u64>,
    /// Bytes captured per stream; anything past this is read and discarded
    pub output_limit_bytes: u64,
}

impl RunLimits {
    pub fn new(wall_time_ms: u64, address_space_mb: Option<u64>) -> Self {
        Self {
            wall_time_ms,
            address_space_mb,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }

    pub fn with_output_limit(mut self, bytes: u64) -> Self {
        self.output_limit_bytes = bytes;
        self
    }
}

impl Default for RunLimits {
    fn default() -> Self {
        Self::new(5000, Some(256))
    }
}

/// How the process ended (raw, no verdict interpretation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Exited(i32),
    /// Killed after exceeding its wall-clock limit
    TimeLimitExceeded,
    /// Terminated by this signal
    Signaled(i32),
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Exited(0))
    }
}

/// Everything observed about one finished execution
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub elapsed_ms: u64,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn timed_out(&self) -> bool {
        self.status == RunStatus::TimeLimitExceeded
    }
}

/// Executes one command under limits, optionally feeding it stdin
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(
        &self,
        cmd: &CommandSpec,
        limits: &RunLimits,
        stdin: Option<&str>,
    ) -> Result<RunOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_from_vec() {
        let cmd = CommandSpec::from_vec(&["g++".into(), "-O2".into(), "main.cpp".into()]);
        assert_eq!(cmd.program, "g++");
        assert_eq!(cmd.args, vec!["-O2", "main.cpp"]);

        let empty = CommandSpec::from_vec(&[]);
        assert_eq!(empty.program, "");
        assert!(empty.args.is_empty());
    }

    #[test]
    fn test_resolved_program() {
        let local = CommandSpec::new("./a.out").with_work_dir("/tmp/box");
        assert_eq!(local.resolved_program(), PathBuf::from("/tmp/box/a.out"));

        let on_path = CommandSpec::new("python3").with_work_dir("/tmp/box");
        assert_eq!(on_path.resolved_program(), PathBuf::from("python3"));
    }

    #[test]
    fn test_status_success() {
        assert!(RunStatus::Exited(0).is_success());
        assert!(!RunStatus::Exited(1).is_success());
        assert!(!RunStatus::TimeLimitExceeded.is_success());
        assert!(!RunStatus::Signaled(9).is_success());
    }
}
