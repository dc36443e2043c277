//! Case extraction - per-problem fixture grammars
//!
//! Each problem owns a tiny grammar describing how its stdin/stdout fixtures
//! map onto function arguments and a return value. There is deliberately no
//! universal grammar: a problem either registers a schema or is only ever
//! graded through stdin.

mod builtin;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::problem::{Problem, TestCase};
use crate::value::Value;

pub use builtin::builtin_schemas;

/// Why a fixture could not be read under its problem's grammar
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("no schema registered for problem {0}")]
    UnknownProblem(i64),

    #[error("line {0} is missing")]
    MissingLine(usize),

    #[error("expected an integer, got {0:?}")]
    NotAnInteger(String),

    #[error("expected {expected} fields, got {found} in {line:?}")]
    FieldCount {
        expected: usize,
        found: usize,
        line: String,
    },
}

/// How an argument is spelled in Java call position.
///
/// Python needs no such hint; every value has one natural literal there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Whatever the value's own literal is
    Native,
    /// `new int[]{...}`
    IntArray,
    /// `new int[][]{new int[]{...}, ...}`
    IntMatrix,
    /// `new char[][]{"row".toCharArray(), ...}`
    CharGrid,
}

/// A fixture lifted into typed arguments and a typed expected value
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredCase {
    pub args: Vec<Value>,
    pub expected: Value,
}

/// Fixture grammar and call shape of one problem
pub trait ProblemSchema: Send + Sync {
    fn problem_id(&self) -> i64;

    /// Java call-position shape of each argument, in order
    fn params(&self) -> &[Param];

    fn parse(&self, test: &TestCase) -> Result<StructuredCase, SchemaError>;
}

type ParseFn = fn(&TestCase) -> Result<StructuredCase, SchemaError>;

/// A schema made of plain data: an id, parameter shapes and a parse rule
pub struct FixtureSchema {
    pub id: i64,
    pub params: &'static [Param],
    pub parse: ParseFn,
}

impl ProblemSchema for FixtureSchema {
    fn problem_id(&self) -> i64 {
        self.id
    }

    fn params(&self) -> &[Param] {
        self.params
    }

    fn parse(&self, test: &TestCase) -> Result<StructuredCase, SchemaError> {
        (self.parse)(test)
    }
}

/// Schemas keyed by problem id
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<i64, Arc<dyn ProblemSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in contest problem
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for schema in builtin_schemas() {
            registry.register(schema);
        }
        registry
    }

    /// Register (or replace) the schema for its problem id
    pub fn register(&mut self, schema: Arc<dyn ProblemSchema>) {
        self.schemas.insert(schema.problem_id(), schema);
    }

    pub fn get(&self, problem_id: i64) -> Option<Arc<dyn ProblemSchema>> {
        self.schemas.get(&problem_id).cloned()
    }

    /// Lift every fixture of `problem`, or none at all.
    ///
    /// A problem is either structured across all its cases or not
    /// structured, so one unreadable fixture discards the whole batch.
    pub fn extract(&self, problem: &Problem) -> Result<Vec<StructuredCase>, SchemaError> {
        let schema = self
            .get(problem.id)
            .ok_or(SchemaError::UnknownProblem(problem.id))?;
        problem.tests.iter().map(|test| schema.parse(test)).collect()
    }
}
