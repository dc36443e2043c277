//! Grade reports returned to callers

use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Verdict for a single test case
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestOutcome {
    pub passed: bool,
    /// Human-readable cause; empty when passed
    #[serde(default)]
    pub error: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub compile_error: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub timeout: bool,
    /// Raw stdin payload (stdin-based testing only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Trimmed expected output (stdin-based testing only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Raw program output (stdin-based testing only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl TestOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            passed: false,
            error: error.into(),
            ..Default::default()
        }
    }
}

/// Result of grading one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    pub passed: usize,
    pub total: usize,
    /// One entry per test, in test order
    pub details: Vec<TestOutcome>,
    pub compile_error: bool,
}

impl GradeReport {
    /// Aggregate per-test outcomes; `total` is the number of outcomes
    pub fn from_details(details: Vec<TestOutcome>) -> Self {
        let passed = details.iter().filter(|d| d.passed).count();
        let compile_error = details.iter().any(|d| d.compile_error);
        Self {
            passed,
            total: details.len(),
            details,
            compile_error,
        }
    }

    /// The whole structured batch failed to build: a single synthetic
    /// detail stands in for all `total` cases.
    pub fn batch_compile_failure(total: usize, diagnostic: impl Into<String>) -> Self {
        Self {
            passed: 0,
            total,
            details: vec![TestOutcome {
                compile_error: true,
                ..TestOutcome::fail(diagnostic)
            }],
            compile_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_details_counts() {
        let report = GradeReport::from_details(vec![
            TestOutcome::pass(),
            TestOutcome::fail("Got 1 Expected 2"),
            TestOutcome::pass(),
        ]);
        assert_eq!(report.passed, 2);
        assert_eq!(report.total, 3);
        assert!(!report.compile_error);
    }

    #[test]
    fn test_batch_compile_failure_shape() {
        let report = GradeReport::batch_compile_failure(4, "Main.java:1: error");
        assert_eq!(report.total, 4);
        assert_eq!(report.details.len(), 1);
        assert!(report.details[0].compile_error);
        assert_eq!(report.passed, 0);
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_value(TestOutcome::pass()).unwrap();
        assert_eq!(json, serde_json::json!({ "passed": true, "error": "" }));
    }
}
