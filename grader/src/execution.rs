//! Isolated compile-and-run of candidate programs
//!
//! Every [`Program`] owns a fresh temporary directory that disappears when
//! the program is dropped, whatever happened inside it. Concurrent gradings
//! therefore never share paths.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::debug;

use crate::compiler::compile_in_workspace;
use crate::config::GraderConfig;
use crate::languages::{BuildSpec, LanguageConfig};
use crate::runner::{CommandSpec, RunLimits, RunOutcome, Runner};

/// Classified outcome of one compile-and-run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    /// Captured stderr, or the diagnostic when compilation or execution
    /// did not get that far
    pub stderr: String,
    pub compile_error: bool,
    pub timeout: bool,
}

impl ExecutionResult {
    fn compile_failure(message: String, timed_out: bool) -> Self {
        Self {
            stderr: message,
            compile_error: true,
            timeout: timed_out,
            ..Default::default()
        }
    }

    fn from_outcome(outcome: RunOutcome) -> Self {
        if outcome.timed_out() {
            return Self {
                stderr: "Execution timed out".to_string(),
                timeout: true,
                ..Default::default()
            };
        }
        Self {
            success: outcome.is_success(),
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            ..Default::default()
        }
    }

    fn system_failure(err: anyhow::Error) -> Self {
        Self {
            stderr: format!("Failed to run program: {:#}", err),
            ..Default::default()
        }
    }
}

/// Exclusive scratch directory for one grading call
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create(root: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("grader-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .context("Failed to create workspace")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, file_name: &str, contents: &str) -> anyhow::Result<()> {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// A program built once in its workspace and runnable many times
pub struct Program<'a> {
    runner: &'a dyn Runner,
    workspace: Workspace,
    run_command: Vec<String>,
    limits: RunLimits,
    compile_failure: Option<ExecutionResult>,
}

impl<'a> Program<'a> {
    /// Write `files` into a new workspace and compile them per `spec`.
    ///
    /// A failed compilation is not an error; it is remembered and returned
    /// by [`Program::compile_failure`].
    pub async fn build(
        runner: &'a dyn Runner,
        config: &GraderConfig,
        language: &LanguageConfig,
        spec: &BuildSpec,
        files: &[(&str, &str)],
    ) -> anyhow::Result<Program<'a>> {
        let workspace = Workspace::create(config.work_dir.as_deref())?;
        for (name, contents) in files {
            workspace.write(name, contents)?;
        }

        let compile_failure = match &spec.compile_command {
            Some(cmd) => {
                let result =
                    compile_in_workspace(runner, workspace.path(), cmd, &config.compile_limits())
                        .await;
                if result.success {
                    None
                } else {
                    debug!("Compilation failed in {:?}", workspace.path());
                    Some(ExecutionResult::compile_failure(
                        result.message.unwrap_or_default(),
                        result.timed_out,
                    ))
                }
            }
            None => None,
        };

        Ok(Program {
            runner,
            workspace,
            run_command: spec.run_command.clone(),
            limits: config.run_limits(language),
            compile_failure,
        })
    }

    /// The build's failure, if it failed
    pub fn compile_failure(&self) -> Option<&ExecutionResult> {
        self.compile_failure.as_ref()
    }

    pub fn work_dir(&self) -> &Path {
        self.workspace.path()
    }

    /// Run the built program once with `stdin`
    pub async fn run(&self, stdin: Option<&str>) -> ExecutionResult {
        if let Some(failure) = &self.compile_failure {
            return failure.clone();
        }

        let cmd = CommandSpec::from_vec(&self.run_command).with_work_dir(self.workspace.path());
        match self.runner.run(&cmd, &self.limits, stdin).await {
            Ok(outcome) => ExecutionResult::from_outcome(outcome),
            Err(e) => ExecutionResult::system_failure(e),
        }
    }
}

/// Compile and run `code` once against `stdin` in a throwaway workspace
pub async fn run_once(
    runner: &dyn Runner,
    config: &GraderConfig,
    language: &LanguageConfig,
    code: &str,
    stdin: &str,
) -> anyhow::Result<ExecutionResult> {
    let spec = &language.program;
    let program = Program::build(
        runner,
        config,
        language,
        spec,
        &[(spec.source_file.as_str(), code)],
    )
    .await?;
    Ok(program.run(Some(stdin)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::{Language, LanguageTable};
    use crate::runner::SandboxedRunner;

    fn shell_language() -> LanguageConfig {
        LanguageConfig {
            language: Language::Cpp,
            program: BuildSpec {
                source_file: "prog.sh".to_string(),
                compile_command: Some(vec!["sh".into(), "-n".into(), "prog.sh".into()]),
                run_command: vec!["sh".into(), "prog.sh".into()],
            },
            limit_address_space: true,
            harness: None,
        }
    }

    #[tokio::test]
    async fn test_workspace_removed_on_drop() {
        let config = GraderConfig::default();
        let language = shell_language();
        let program = Program::build(
            &SandboxedRunner,
            &config,
            &language,
            &language.program,
            &[("prog.sh", "cat")],
        )
        .await
        .unwrap();

        let dir = program.work_dir().to_path_buf();
        assert!(dir.join("prog.sh").exists());
        assert!(program.compile_failure().is_none());

        let result = program.run(Some("ping")).await;
        assert!(result.success);
        assert_eq!(result.stdout, "ping");

        drop(program);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_compile_failure_is_sticky() {
        let config = GraderConfig::default();
        let language = shell_language();
        let program = Program::build(
            &SandboxedRunner,
            &config,
            &language,
            &language.program,
            &[("prog.sh", "if then fi (")],
        )
        .await
        .unwrap();

        let failure = program.compile_failure().unwrap().clone();
        assert!(failure.compile_error);
        assert!(!failure.success);
        assert!(!failure.stderr.is_empty());
        assert_eq!(program.run(Some("")).await, failure);
    }

    #[tokio::test]
    async fn test_distinct_workspaces() {
        let a = Workspace::create(None).unwrap();
        let b = Workspace::create(None).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_run_once_nonzero_exit() {
        let table = LanguageTable::embedded().unwrap();
        let mut language = table.get("python").unwrap().clone();
        language.program = BuildSpec {
            source_file: "prog.sh".to_string(),
            compile_command: None,
            run_command: vec!["sh".into(), "prog.sh".into()],
        };

        let result = run_once(
            &SandboxedRunner,
            &GraderConfig::default(),
            &language,
            "echo bad >&2; exit 1",
            "",
        )
        .await
        .unwrap();

        assert!(!result.success);
        assert!(!result.compile_error);
        assert!(!result.timeout);
        assert_eq!(result.stderr, "bad\n");
    }
}
