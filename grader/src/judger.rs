//! Grading orchestrator
//!
//! [`Grader::grade`] is the engine's entry point. It normalizes the
//! candidate's code, tries structured call-level testing when the language
//! and problem allow it, and otherwise (or when the structured path faults)
//! grades by piping each fixture through the whole program.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::GraderConfig;
use crate::error::GradeError;
use crate::execution::{run_once, ExecutionResult, Program};
use crate::harness::{self, protocol, HarnessFault};
use crate::languages::{LanguageConfig, LanguageTable};
use crate::normalize::normalize;
use crate::problem::{Problem, TestCase};
use crate::report::{GradeReport, TestOutcome};
use crate::runner::{Runner, SandboxedRunner};
use crate::schema::{SchemaError, SchemaRegistry};

/// Result of the structured path: a report, or the reason to fall back
#[derive(Debug)]
pub enum StructuredOutcome {
    Graded(GradeReport),
    Fault(HarnessFault),
}

/// The judging engine. Holds no per-call state; one instance may grade
/// any number of submissions concurrently.
pub struct Grader {
    config: GraderConfig,
    languages: LanguageTable,
    schemas: SchemaRegistry,
    runner: Arc<dyn Runner>,
}

impl Grader {
    /// Grader with the configured language table, the built-in problem
    /// schemas and the subprocess runner
    pub fn new(config: GraderConfig) -> anyhow::Result<Self> {
        let languages = match &config.languages_config {
            Some(path) => LanguageTable::from_file(path)?,
            None => LanguageTable::embedded()?,
        };
        Ok(Self::with_parts(
            config,
            languages,
            SchemaRegistry::with_builtin(),
            Arc::new(SandboxedRunner::new()),
        ))
    }

    pub fn with_parts(
        config: GraderConfig,
        languages: LanguageTable,
        schemas: SchemaRegistry,
        runner: Arc<dyn Runner>,
    ) -> Self {
        Self {
            config,
            languages,
            schemas,
            runner,
        }
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    pub fn schemas_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.schemas
    }

    /// Grade `code` written in `language` against every test of `problem`.
    ///
    /// Only an unknown language or an infrastructure failure is an error;
    /// everything the candidate does wrong ends up in the report.
    pub async fn grade(
        &self,
        language: &str,
        code: &str,
        problem: &Problem,
    ) -> Result<GradeReport, GradeError> {
        let lang = self.languages.resolve(language)?;
        info!(
            "Grading problem {} in {} ({} tests)",
            problem.id,
            lang.language,
            problem.tests.len()
        );

        let code = normalize(lang.language, code);

        let report = match self.grade_structured(lang, &code, problem).await {
            StructuredOutcome::Graded(report) => report,
            StructuredOutcome::Fault(fault) => {
                match &fault {
                    HarnessFault::Unsupported(_)
                    | HarnessFault::Extraction(SchemaError::UnknownProblem(_)) => {
                        debug!("Structured testing skipped: {}", fault)
                    }
                    _ => warn!(
                        "Structured testing failed for problem {}, falling back to stdin: {}",
                        problem.id, fault
                    ),
                }
                self.grade_stdin(lang, &code, problem).await?
            }
        };

        info!(
            "Grade summary: problem_id={}, language={}, passed={}/{}, compile_error={}",
            problem.id, lang.language, report.passed, report.total, report.compile_error
        );
        Ok(report)
    }

    /// Run the structured path on already-normalized `code`
    pub async fn grade_structured(
        &self,
        lang: &LanguageConfig,
        code: &str,
        problem: &Problem,
    ) -> StructuredOutcome {
        match self.try_structured(lang, code, problem).await {
            Ok(report) => StructuredOutcome::Graded(report),
            Err(fault) => StructuredOutcome::Fault(fault),
        }
    }

    async fn try_structured(
        &self,
        lang: &LanguageConfig,
        code: &str,
        problem: &Problem,
    ) -> Result<GradeReport, HarnessFault> {
        let harness_spec = lang
            .harness
            .as_ref()
            .ok_or(HarnessFault::Unsupported(lang.language))?;

        let cases = self.schemas.extract(problem)?;
        if cases.is_empty() {
            return Err(HarnessFault::NoCases);
        }
        let schema = self
            .schemas
            .get(problem.id)
            .ok_or(SchemaError::UnknownProblem(problem.id))?;

        let signature = problem
            .signature_for(lang.language.name())
            .ok_or(HarnessFault::MissingSignature(lang.language))?;
        let function = harness::function_name(signature)
            .ok_or_else(|| HarnessFault::NoCallable(signature.to_string()))?;

        let source = harness::generate(lang.language, function, &cases, schema.params())?;
        debug!(
            "Generated {} harness for {} with {} cases",
            lang.language,
            function,
            cases.len()
        );

        let files = [
            (lang.program.source_file.as_str(), code),
            (harness_spec.source_file.as_str(), source.as_str()),
        ];
        let program =
            Program::build(self.runner.as_ref(), &self.config, lang, harness_spec, &files).await?;

        if let Some(failure) = program.compile_failure() {
            return Ok(GradeReport::batch_compile_failure(
                cases.len(),
                failure.stderr.clone(),
            ));
        }

        let result = program.run(None).await;
        if result.timeout {
            return Err(HarnessFault::Timeout);
        }

        let details = protocol::parse_results(&result.stdout, &result.stderr, cases.len())?;
        Ok(GradeReport::from_details(details))
    }

    /// Grade by running the whole program once per test with its input on
    /// stdin, comparing trimmed output
    pub async fn grade_stdin(
        &self,
        lang: &LanguageConfig,
        code: &str,
        problem: &Problem,
    ) -> Result<GradeReport, GradeError> {
        let spec = &lang.program;
        let program = Program::build(
            self.runner.as_ref(),
            &self.config,
            lang,
            spec,
            &[(spec.source_file.as_str(), code)],
        )
        .await?;

        let mut details = Vec::with_capacity(problem.tests.len());
        let mut compile_failed = false;

        for test in &problem.tests {
            if compile_failed {
                details.push(TestOutcome {
                    compile_error: true,
                    input: Some(test.input.clone()),
                    expected: Some(test.output.trim().to_string()),
                    output: Some(String::new()),
                    ..TestOutcome::fail("Compilation failed")
                });
                continue;
            }

            let result = program.run(Some(&test.input)).await;
            compile_failed = result.compile_error;
            details.push(stdin_outcome(test, result));
        }

        Ok(GradeReport::from_details(details))
    }

    /// Compile and run `code` once against `stdin`
    pub async fn execute(
        &self,
        language: &str,
        code: &str,
        stdin: &str,
    ) -> Result<ExecutionResult, GradeError> {
        let lang = self.languages.resolve(language)?;
        let code = normalize(lang.language, code);
        Ok(run_once(self.runner.as_ref(), &self.config, lang, &code, stdin).await?)
    }
}

fn stdin_outcome(test: &TestCase, result: ExecutionResult) -> TestOutcome {
    let expected = test.output.trim().to_string();
    let passed = result.success && result.stdout.trim() == expected;

    let error = if passed {
        String::new()
    } else if !result.stderr.is_empty() {
        preview(&result.stderr)
    } else if result.success {
        "Wrong answer".to_string()
    } else {
        "Runtime error".to_string()
    };

    TestOutcome {
        passed,
        error,
        compile_error: result.compile_error,
        timeout: result.timeout,
        input: Some(test.input.clone()),
        expected: Some(expected),
        output: Some(preview(&result.stdout)),
    }
}

/// Longest program output or diagnostic copied into a report
const PREVIEW_CHARS: usize = 4096;

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
