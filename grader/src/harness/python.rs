//! Python harness: imports the candidate as the `solution` module

use crate::schema::StructuredCase;
use crate::value::Value;

use super::quote;

/// Render `value` as a Python literal
pub fn literal(value: &Value) -> String {
    match value {
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Str(s) => quote(s),
        Value::List(items) => {
            let inner: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", inner.join(", "))
        }
    }
}

fn case_literal(case: &StructuredCase) -> String {
    let args: Vec<String> = case.args.iter().map(literal).collect();
    format!(
        "{{\"args\": [{}], \"expected\": {}}}",
        args.join(", "),
        literal(&case.expected)
    )
}

pub fn generate(function: &str, cases: &[StructuredCase]) -> String {
    let case_lines: String = cases
        .iter()
        .map(|case| format!("    {},\n", case_literal(case)))
        .collect();

    format!(
        r#"import json
import sys

import solution

cases = [
{cases}]

fn = getattr(solution, "{function}", None)
if fn is None:
    sys.exit(3)

for idx, case in enumerate(cases):
    try:
        res = fn(*case["args"])
        if res == case["expected"]:
            print(f"RESULT|{{idx}}|PASS")
        else:
            print(f"RESULT|{{idx}}|FAIL|{{json.dumps(res)}}|{{json.dumps(case['expected'])}}")
    except Exception as e:
        print(f"RESULT|{{idx}}|ERROR|{{type(e).__name__}}:{{e}}")
"#,
        cases = case_lines,
        function = function,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(literal(&Value::Int(-7)), "-7");
        assert_eq!(literal(&Value::Bool(true)), "True");
        assert_eq!(literal(&Value::Bool(false)), "False");
        assert_eq!(literal(&Value::from("say \"hi\"")), r#""say \"hi\"""#);
        assert_eq!(literal(&Value::from(Vec::<i64>::new())), "[]");
        assert_eq!(
            literal(&Value::from(vec![vec!["a"], vec![]])),
            r#"[["a"], []]"#
        );
    }

    #[test]
    fn test_generate_embeds_cases() {
        let cases = vec![StructuredCase {
            args: vec![Value::from(vec!["a", "b"]), Value::from(vec!["a"])],
            expected: Value::Int(1),
        }];

        let source = generate("removedNames", &cases);
        assert!(source.contains("import solution"));
        assert!(source.contains(r#"    {"args": [["a", "b"], ["a"]], "expected": 1},"#));
        assert!(source.contains(r#"getattr(solution, "removedNames", None)"#));
        assert!(source.contains(r#"print(f"RESULT|{idx}|PASS")"#));
    }
}
