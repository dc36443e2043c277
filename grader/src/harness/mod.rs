//! Harness generation for structured testing
//!
//! A harness is a generated program that calls the candidate's function once
//! per case with the arguments embedded as literals and prints one
//! `RESULT|<index>|...` line per case (see [`protocol`]).

pub mod java;
pub mod protocol;
pub mod python;

use thiserror::Error;

use crate::languages::Language;
use crate::schema::{Param, SchemaError, StructuredCase};

/// Anything that goes wrong on the structured path.
///
/// These never reach the caller; the grader falls back to stdin testing.
#[derive(Debug, Error)]
pub enum HarnessFault {
    #[error("structured testing is not supported for {0}")]
    Unsupported(Language),

    #[error("problem has no structured cases: {0}")]
    Extraction(#[from] SchemaError),

    #[error("problem has no test cases")]
    NoCases,

    #[error("no {0} method signature declared")]
    MissingSignature(Language),

    #[error("no callable name in signature {0:?}")]
    NoCallable(String),

    #[error("case {index} has {found} arguments, schema declares {expected}")]
    ArityMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("{0} has no {1} literal")]
    Unrenderable(i64, &'static str),

    #[error("harness timed out")]
    Timeout,

    #[error("malformed result line {0:?}")]
    MalformedLine(String),

    #[error("result index {0} reported more than once or out of range")]
    BadIndex(usize),

    #[error("no result for case {index}: {stderr}")]
    MissingResult { index: usize, stderr: String },

    #[error("harness infrastructure error: {0:#}")]
    Infrastructure(#[from] anyhow::Error),
}

/// Generate the harness program for `language`
pub fn generate(
    language: Language,
    function: &str,
    cases: &[StructuredCase],
    params: &[Param],
) -> Result<String, HarnessFault> {
    match language {
        Language::Python => Ok(python::generate(function, cases)),
        Language::Java => java::generate(function, cases, params),
        Language::Cpp => Err(HarnessFault::Unsupported(language)),
    }
}

/// Recover the callable name from a declaration such as
/// `def removedNames(a, b):` or `public static int removedNames(String[] a)`.
pub fn function_name(signature: &str) -> Option<&str> {
    let (head, _) = signature.split_once('(')?;
    let name = head.split_whitespace().last()?;

    let mut chars = name.chars();
    let first = chars.next()?;
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

/// Quote a string, escaping only backslash and double quote
pub(crate) fn quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
