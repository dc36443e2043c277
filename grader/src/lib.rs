//! Judging engine for contest submissions
//!
//! Grades candidate source code against a problem's fixtures, either by
//! calling the candidate's function through a generated harness or by
//! comparing whole-program output, inside time- and memory-bounded
//! subprocesses.

pub mod compiler;
pub mod config;
pub mod error;
pub mod execution;
pub mod harness;
pub mod judger;
pub mod languages;
pub mod normalize;
pub mod problem;
pub mod report;
pub mod runner;
pub mod schema;
pub mod value;

pub use config::GraderConfig;
pub use error::{ErrorResponse, GradeError};
pub use execution::ExecutionResult;
pub use judger::{Grader, StructuredOutcome};
pub use languages::{Language, LanguageTable};
pub use problem::{Problem, ProblemStore, TestCase};
pub use report::{GradeReport, TestOutcome};
pub use value::Value;
