//! Problem definitions and the on-disk problem store

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::GradeError;

/// One raw fixture: stdin payload and expected stdout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// A contest problem as the engine sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    #[serde(default)]
    pub tests: Vec<TestCase>,
    /// Language name -> declaration of the function candidates must write
    #[serde(default)]
    pub method_signatures: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
}

impl Problem {
    pub fn new(id: i64, tests: Vec<TestCase>) -> Self {
        Self {
            id,
            tests,
            method_signatures: HashMap::new(),
            title: None,
            description: None,
            constraints: None,
        }
    }

    pub fn with_signature(mut self, language: &str, signature: &str) -> Self {
        self.method_signatures
            .insert(language.to_string(), signature.to_string());
        self
    }

    /// Signature declared for `language`, matching keys case-insensitively
    pub fn signature_for(&self, language: &str) -> Option<&str> {
        self.method_signatures
            .get(language)
            .or_else(|| {
                self.method_signatures
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(language))
                    .map(|(_, sig)| sig)
            })
            .map(String::as_str)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read problem file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse problem file {}", path.display()))
    }
}

/// Listing entry for a stored problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemSummary {
    pub id: i64,
    pub title: Option<String>,
}

/// Directory of `<id>.json` problem files
pub struct ProblemStore {
    dir: PathBuf,
}

impl ProblemStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, problem_id: i64) -> Result<Problem, GradeError> {
        let path = self.dir.join(format!("{}.json", problem_id));
        if !path.exists() {
            return Err(GradeError::ProblemNotFound(problem_id));
        }
        Ok(Problem::from_json_file(&path)?)
    }

    pub fn list(&self) -> anyhow::Result<Vec<ProblemSummary>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read problem directory {}", self.dir.display()))?;

        let mut problems = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            // Only numerically named files are problems
            let is_numeric = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.parse::<i64>().is_ok());
            if !is_numeric {
                continue;
            }
            let problem = Problem::from_json_file(&path)?;
            problems.push(ProblemSummary {
                id: problem.id,
                title: problem.title,
            });
        }
        problems.sort_by_key(|p| p.id);
        Ok(problems)
    }
}
