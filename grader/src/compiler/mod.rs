//! Compiler module - Source code compilation
//!
//! Runs a language's compile command inside a workspace through a
//! [`Runner`], turning the raw outcome into a pass/fail result carrying the
//! compiler's diagnostic.

use std::path::Path;
use tracing::debug;

use crate::runner::{CommandSpec, RunLimits, RunStatus, Runner};

/// Result of a compilation attempt
#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    pub success: bool,
    pub message: Option<String>,
    /// The compiler exceeded its time budget
    pub timed_out: bool,
}

impl CompileResult {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
            timed_out: false,
        }
    }

    fn failed(message: impl Into<String>, timed_out: bool) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            timed_out,
        }
    }
}

/// Compile source code inside `work_dir`.
///
/// Never fails: a compiler that cannot even be started is reported as a
/// failed compilation.
pub async fn compile_in_workspace(
    runner: &dyn Runner,
    work_dir: &Path,
    compile_cmd: &[String],
    limits: &RunLimits,
) -> CompileResult {
    if compile_cmd.is_empty() {
        return CompileResult::ok();
    }

    debug!("Compiling with {:?} in {:?}", compile_cmd, work_dir);

    let spec = CommandSpec::from_vec(compile_cmd).with_work_dir(work_dir);

    let result = match runner.run(&spec, limits, None).await {
        Ok(result) => result,
        Err(e) => {
            return CompileResult::failed(format!("Failed to run compiler: {:#}", e), false);
        }
    };

    if result.is_success() {
        return CompileResult::ok();
    }

    if result.timed_out() {
        return CompileResult::failed("Compilation timed out", true);
    }

    let error_msg = if !result.stderr.is_empty() {
        result.stderr
    } else if !result.stdout.is_empty() {
        result.stdout
    } else {
        match result.status {
            RunStatus::Signaled(_) => "Compiler crashed".to_string(),
            RunStatus::Exited(code) => format!("Compilation failed with exit code {}", code),
            RunStatus::TimeLimitExceeded => "Compilation timed out".to_string(),
        }
    };

    CompileResult::failed(error_msg, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::SandboxedRunner;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_empty_command_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            compile_in_workspace(&SandboxedRunner, dir.path(), &[], &RunLimits::default()).await;
        assert_eq!(result, CompileResult::ok());
    }

    #[tokio::test]
    async fn test_diagnostic_prefers_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let result = compile_in_workspace(
            &SandboxedRunner,
            dir.path(),
            &sh("echo out; echo 'main.cpp:1: error' >&2; exit 1"),
            &RunLimits::default(),
        )
        .await;

        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("main.cpp:1: error\n"));
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn test_silent_failure_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            compile_in_workspace(&SandboxedRunner, dir.path(), &sh("exit 4"), &RunLimits::default())
                .await;
        assert_eq!(
            result.message.as_deref(),
            Some("Compilation failed with exit code 4")
        );
    }

    #[tokio::test]
    async fn test_compile_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let result = compile_in_workspace(
            &SandboxedRunner,
            dir.path(),
            &sh("sleep 10"),
            &RunLimits::new(200, None),
        )
        .await;
        assert_eq!(result, CompileResult::failed("Compilation timed out", true));
    }

    #[tokio::test]
    async fn test_missing_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let result = compile_in_workspace(
            &SandboxedRunner,
            dir.path(),
            &["no-such-compiler-7731".to_string()],
            &RunLimits::default(),
        )
        .await;
        assert!(!result.success);
        assert!(result
            .message
            .unwrap()
            .starts_with("Failed to run compiler"));
    }
}
