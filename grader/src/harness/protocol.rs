//! Harness line protocol
//!
//! ```text
//! RESULT|<index>|PASS
//! RESULT|<index>|FAIL|<actual>|<expected>
//! RESULT|<index>|ERROR|<kind>:<message>
//! ```
//!
//! Any other stdout line (the candidate's own prints, say) is ignored.

use super::HarnessFault;
use crate::report::TestOutcome;

const PREFIX: &str = "RESULT|";

/// Parse harness stdout into one outcome per case, in case order.
///
/// Every case must be reported exactly once; anything less means the
/// harness did not run to completion and its output cannot be trusted.
pub fn parse_results(
    stdout: &str,
    stderr: &str,
    total: usize,
) -> Result<Vec<TestOutcome>, HarnessFault> {
    let mut slots: Vec<Option<TestOutcome>> = vec![None; total];

    for line in stdout.lines() {
        if !line.starts_with(PREFIX) {
            continue;
        }
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() < 3 {
            return Err(HarnessFault::MalformedLine(line.to_string()));
        }
        let index: usize = parts[1]
            .trim()
            .parse()
            .map_err(|_| HarnessFault::MalformedLine(line.to_string()))?;

        let outcome = match parts[2] {
            "PASS" => TestOutcome::pass(),
            "FAIL" => {
                let message = if parts.len() >= 5 {
                    format!("Got {} Expected {}", parts[3], parts[4])
                } else {
                    "Mismatch".to_string()
                };
                TestOutcome::fail(message)
            }
            "ERROR" => {
                let message = if parts.len() > 3 {
                    parts[3..].join("|")
                } else {
                    "Runtime error".to_string()
                };
                TestOutcome::fail(message)
            }
            _ => return Err(HarnessFault::MalformedLine(line.to_string())),
        };

        match slots.get_mut(index) {
            Some(slot) if slot.is_none() => *slot = Some(outcome),
            _ => return Err(HarnessFault::BadIndex(index)),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| HarnessFault::MissingResult {
                index,
                stderr: stderr.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_statuses() {
        let stdout = "\
debug print from candidate
RESULT|1|FAIL|[1, 2]|[2, 1]
RESULT|0|PASS
RESULT|2|ERROR|ZeroDivisionError:division by zero
RESULT|3|FAIL
RESULT|4|ERROR
";
        let outcomes = parse_results(stdout, "", 5).unwrap();

        assert!(outcomes[0].passed);
        assert_eq!(outcomes[0].error, "");
        assert!(!outcomes[1].passed);
        assert_eq!(outcomes[1].error, "Got [1, 2] Expected [2, 1]");
        assert_eq!(outcomes[2].error, "ZeroDivisionError:division by zero");
        assert_eq!(outcomes[3].error, "Mismatch");
        assert_eq!(outcomes[4].error, "Runtime error");
    }

    #[test]
    fn test_error_message_keeps_pipes() {
        let outcomes = parse_results("RESULT|0|ERROR|ValueError:a|b\n", "", 1).unwrap();
        assert_eq!(outcomes[0].error, "ValueError:a|b");
    }

    #[test]
    fn test_missing_case_is_fault() {
        let result = parse_results("RESULT|0|PASS\n", "Traceback ...\n", 2);
        match result {
            Err(HarnessFault::MissingResult { index, stderr }) => {
                assert_eq!(index, 1);
                assert_eq!(stderr, "Traceback ...");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_bad_lines_are_faults() {
        assert!(matches!(
            parse_results("RESULT|0|PASS\nRESULT|0|PASS\n", "", 1),
            Err(HarnessFault::BadIndex(0))
        ));
        assert!(matches!(
            parse_results("RESULT|5|PASS\n", "", 1),
            Err(HarnessFault::BadIndex(5))
        ));
        assert!(matches!(
            parse_results("RESULT|x|PASS\n", "", 1),
            Err(HarnessFault::MalformedLine(_))
        ));
        assert!(matches!(
            parse_results("RESULT|0|MAYBE\n", "", 1),
            Err(HarnessFault::MalformedLine(_))
        ));
    }

    #[test]
    fn test_empty_batch() {
        assert!(parse_results("", "", 0).unwrap().is_empty());
    }
}
