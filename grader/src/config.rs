//! Grader configuration
//!
//! Limits and paths, with defaults suitable for contest problems and
//! overrides taken from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

use crate::languages::LanguageConfig;
use crate::runner::RunLimits;

#[derive(Debug, Clone, PartialEq)]
pub struct GraderConfig {
    /// Wall-clock budget per execution in seconds (default: 5)
    pub run_timeout_secs: u64,
    /// Wall-clock budget per compilation in seconds (default: 10)
    pub compile_timeout_secs: u64,
    /// Memory ceiling for candidate processes in MB (default: 256)
    pub memory_limit_mb: u64,
    /// Captured stdout and stderr per execution in KB (default: 16384)
    pub output_limit_kb: u64,
    /// Parent directory for per-submission workspaces (default: system temp)
    pub work_dir: Option<PathBuf>,
    /// Replacement language table (default: the embedded one)
    pub languages_config: Option<PathBuf>,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            run_timeout_secs: 5,
            compile_timeout_secs: 10,
            memory_limit_mb: 256,
            output_limit_kb: 16 * 1024,
            work_dir: None,
            languages_config: None,
        }
    }
}

impl GraderConfig {
    /// Load configuration from `GRADER_*` variables and `LANGUAGES_CONFIG`
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            run_timeout_secs: env_or("GRADER_RUN_TIMEOUT_SECS", defaults.run_timeout_secs)?,
            compile_timeout_secs: env_or(
                "GRADER_COMPILE_TIMEOUT_SECS",
                defaults.compile_timeout_secs,
            )?,
            memory_limit_mb: env_or("GRADER_MEMORY_LIMIT_MB", defaults.memory_limit_mb)?,
            output_limit_kb: env_or("GRADER_OUTPUT_LIMIT_KB", defaults.output_limit_kb)?,
            work_dir: std::env::var_os("GRADER_WORK_DIR").map(PathBuf::from),
            languages_config: std::env::var_os("LANGUAGES_CONFIG").map(PathBuf::from),
        })
    }

    /// Limits for running a program of `language`
    pub fn run_limits(&self, language: &LanguageConfig) -> RunLimits {
        RunLimits::new(
            self.run_timeout_secs * 1000,
            language.limit_address_space.then_some(self.memory_limit_mb),
        )
        .with_output_limit(self.output_limit_bytes())
    }

    /// Limits for compilers; they get time and output bounds only
    pub fn compile_limits(&self) -> RunLimits {
        RunLimits::new(self.compile_timeout_secs * 1000, None)
            .with_output_limit(self.output_limit_bytes())
    }

    fn output_limit_bytes(&self) -> u64 {
        self.output_limit_kb.saturating_mul(1024)
    }
}

fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", name, value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageTable;

    #[test]
    fn test_limits_follow_language() {
        let config = GraderConfig::default();
        let table = LanguageTable::embedded().unwrap();

        let cpp = config.run_limits(table.get("cpp").unwrap());
        assert_eq!(cpp, RunLimits::new(5000, Some(256)));

        let java = config.run_limits(table.get("java").unwrap());
        assert_eq!(java, RunLimits::new(5000, None));

        assert_eq!(config.compile_limits(), RunLimits::new(10_000, None));
    }

    #[test]
    fn test_output_limit_applies_to_runs_and_compiles() {
        let config = GraderConfig {
            output_limit_kb: 64,
            ..GraderConfig::default()
        };
        let table = LanguageTable::embedded().unwrap();

        let run = config.run_limits(table.get("python").unwrap());
        assert_eq!(run.output_limit_bytes, 65_536);
        assert_eq!(config.compile_limits().output_limit_bytes, 65_536);
        assert_eq!(
            GraderConfig::default().compile_limits().output_limit_bytes,
            crate::runner::DEFAULT_OUTPUT_LIMIT_BYTES
        );
    }

    #[test]
    fn test_env_or_parses_and_rejects() {
        std::env::set_var("GRADER_TEST_ONLY_VALUE", " 12 ");
        assert_eq!(env_or("GRADER_TEST_ONLY_VALUE", 5u64).unwrap(), 12);

        std::env::set_var("GRADER_TEST_ONLY_VALUE", "twelve");
        assert!(env_or("GRADER_TEST_ONLY_VALUE", 5u64).is_err());

        assert_eq!(env_or("GRADER_TEST_ONLY_UNSET", 7u64).unwrap(), 7);
    }
}
