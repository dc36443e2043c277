//! Fixture grammars of the contest's problem set

use std::sync::Arc;

use super::{FixtureSchema, Param, ProblemSchema, SchemaError, StructuredCase};
use crate::problem::TestCase;
use crate::value::Value;

/// Every built-in problem, one schema each
pub fn builtin_schemas() -> Vec<Arc<dyn ProblemSchema>> {
    use Param::*;

    let table: [(i64, &'static [Param], super::ParseFn); 10] = [
        (1, &[Native, Native], removed_names),
        (2, &[Native], mirror_score),
        (3, &[IntMatrix], good_cookies),
        (4, &[Native], sort_elves),
        (5, &[Native], melt_icicles),
        (6, &[Native, Native, IntMatrix], check_safety),
        (7, &[Native, Native], decode_message),
        (8, &[IntArray], min_difference),
        (9, &[CharGrid], largest_region),
        (10, &[Native, IntMatrix], check_circuit),
    ];

    table
        .into_iter()
        .map(|(id, params, parse)| {
            Arc::new(FixtureSchema { id, params, parse }) as Arc<dyn ProblemSchema>
        })
        .collect()
}

/// Non-blank lines of a fixture, addressed by position
struct Lines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().filter(|l| !l.trim().is_empty()).collect(),
        }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, idx: usize) -> Result<&'a str, SchemaError> {
        self.lines
            .get(idx)
            .copied()
            .ok_or(SchemaError::MissingLine(idx))
    }

    fn int(&self, idx: usize) -> Result<i64, SchemaError> {
        parse_int(self.line(idx)?)
    }

    /// Integer at `idx`, or zero when the fixture ends before it
    fn int_or_zero(&self, idx: usize) -> Result<i64, SchemaError> {
        if idx < self.len() {
            self.int(idx)
        } else {
            Ok(0)
        }
    }

    /// Up to `count` lines starting at `start`; short fixtures give fewer
    fn slice(&self, start: usize, count: usize) -> Vec<Value> {
        self.lines
            .iter()
            .skip(start)
            .take(count)
            .map(|line| Value::from(*line))
            .collect()
    }

    /// `count` lines of exactly two integers starting at `start`
    fn pairs(&self, start: usize, count: usize) -> Result<Vec<Value>, SchemaError> {
        (start..start + count)
            .map(|idx| {
                let [a, b] = int_fields::<2>(self.line(idx)?)?;
                Ok(Value::from(vec![a, b]))
            })
            .collect()
    }
}

fn parse_int(text: &str) -> Result<i64, SchemaError> {
    let trimmed = text.trim();
    trimmed
        .parse()
        .map_err(|_| SchemaError::NotAnInteger(trimmed.to_string()))
}

fn parse_count(text: &str) -> Result<usize, SchemaError> {
    let n = parse_int(text)?;
    usize::try_from(n).map_err(|_| SchemaError::NotAnInteger(n.to_string()))
}

fn count_of(n: i64) -> Result<usize, SchemaError> {
    usize::try_from(n).map_err(|_| SchemaError::NotAnInteger(n.to_string()))
}

fn int_fields<const N: usize>(line: &str) -> Result<[i64; N], SchemaError> {
    let fields = line
        .split_whitespace()
        .map(parse_int)
        .collect::<Result<Vec<_>, _>>()?;
    <[i64; N]>::try_from(fields).map_err(|fields| SchemaError::FieldCount {
        expected: N,
        found: fields.len(),
        line: line.to_string(),
    })
}

/// Integers separated by commas and/or whitespace
fn int_list(text: &str) -> Result<Vec<i64>, SchemaError> {
    text.replace(',', " ")
        .split_whitespace()
        .map(parse_int)
        .collect()
}

fn int_output(test: &TestCase) -> Result<Value, SchemaError> {
    parse_int(&test.output).map(Value::Int)
}

fn str_output(test: &TestCase) -> Value {
    Value::from(test.output.trim())
}

fn case(args: Vec<Value>, expected: Value) -> Result<StructuredCase, SchemaError> {
    Ok(StructuredCase { args, expected })
}

/// `N`, N names, `M`, M names
fn removed_names(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    let lines = Lines::new(&test.input);
    let n = parse_count(lines.line(0)?)?;
    let draft = lines.slice(1, n);
    let idx = 1 + n;
    let m = count_of(lines.int_or_zero(idx)?)?;
    let fin = lines.slice(idx + 1, m);
    case(vec![Value::List(draft), Value::List(fin)], int_output(test)?)
}

fn mirror_score(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    case(vec![Value::from(test.input.trim())], int_output(test)?)
}

/// `N`, then N lines of `size temp`
fn good_cookies(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    let lines = Lines::new(&test.input);
    let n = count_of(lines.int_or_zero(0)?)?;
    let cookies = lines.pairs(1, n)?;
    case(vec![Value::List(cookies)], int_output(test)?)
}

/// Comma-separated names; expected order one name per line
fn sort_elves(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    let elves: Vec<Value> = test
        .input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(Value::from)
        .collect();
    let expected: Vec<Value> = test.output.trim().lines().map(Value::from).collect();
    case(vec![Value::List(elves)], Value::List(expected))
}

fn melt_icicles(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    let nums = int_list(&test.input)?;
    let expected = test
        .output
        .trim()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_int)
        .collect::<Result<Vec<_>, _>>()?;
    case(vec![Value::from(nums)], Value::from(expected))
}

/// `start end`, `N`, then N intervals
fn check_safety(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    let lines = Lines::new(&test.input);
    let [start, end] = int_fields::<2>(lines.line(0)?)?;
    let n = count_of(lines.int_or_zero(1)?)?;
    let intervals = lines.pairs(2, n)?;
    case(
        vec![Value::Int(start), Value::Int(end), Value::List(intervals)],
        str_output(test),
    )
}

/// Cipher text, then shift
fn decode_message(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    let lines = Lines::new(&test.input);
    let text = lines.line(0)?;
    let shift = lines.int(1)?;
    case(vec![Value::from(text), Value::Int(shift)], str_output(test))
}

fn min_difference(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    let nums = int_list(&test.input)?;
    case(vec![Value::from(nums)], int_output(test)?)
}

/// `N`, then N grid rows
fn largest_region(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    let lines = Lines::new(&test.input);
    let n = parse_count(lines.line(0)?)?;
    let grid = lines.slice(1, n);
    case(vec![Value::List(grid)], int_output(test)?)
}

/// `N` nodes, `M` edges, then M edges
fn check_circuit(test: &TestCase) -> Result<StructuredCase, SchemaError> {
    let lines = Lines::new(&test.input);
    let n = lines.int_or_zero(0)?;
    let m = count_of(lines.int_or_zero(1)?)?;
    let edges = lines.pairs(2, m)?;
    case(vec![Value::Int(n), Value::List(edges)], str_output(test))
}
