//! Java harness: a `Harness` class calling static methods on `Main`

use crate::schema::{Param, StructuredCase};
use crate::value::Value;

use super::{quote, HarnessFault};

/// Render `value` as a Java expression.
///
/// Shapes without a dedicated literal become `null`, which can only ever
/// compare unequal to a real return value.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Str(s) => quote(s),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::List(items) => list_literal(items),
    }
}

fn list_literal(items: &[Value]) -> String {
    if items.is_empty() {
        return "new ArrayList<>()".to_string();
    }
    if items.iter().all(Value::is_int) || items.iter().all(Value::is_str) {
        return format!("Arrays.asList({})", join(items, literal));
    }
    if items.iter().all(Value::is_int_list) {
        return int_matrix(items);
    }
    if items.iter().all(Value::is_str_list) {
        return format!(
            "new String[][]{{{}}}",
            join(items, |row| format!(
                "new String[]{{{}}}",
                join(row.as_list().unwrap_or_default(), literal)
            ))
        );
    }
    "null".to_string()
}

fn join<F>(items: &[Value], render: F) -> String
where
    F: Fn(&Value) -> String,
{
    items.iter().map(render).collect::<Vec<_>>().join(", ")
}

fn int_array(items: &[Value]) -> String {
    format!("new int[]{{{}}}", join(items, literal))
}

fn int_matrix(rows: &[Value]) -> String {
    format!(
        "new int[][]{{{}}}",
        join(rows, |row| int_array(row.as_list().unwrap_or_default()))
    )
}

/// Render one call argument according to its declared shape
pub fn argument(value: &Value, param: Param) -> String {
    match (param, value) {
        (Param::IntArray, Value::List(items)) => int_array(items),
        (Param::IntMatrix, Value::List(rows)) => int_matrix(rows),
        (Param::CharGrid, Value::List(rows)) => format!(
            "new char[][]{{{}}}",
            join(rows, |row| format!("{}.toCharArray()", literal(row)))
        ),
        _ => literal(value),
    }
}

/// Every int must fit a Java `int`; a wider literal would not compile
fn check_range(value: &Value) -> Result<(), HarnessFault> {
    match value {
        Value::Int(n) if i32::try_from(*n).is_err() => {
            Err(HarnessFault::Unrenderable(*n, "Java int"))
        }
        Value::List(items) => items.iter().try_for_each(check_range),
        _ => Ok(()),
    }
}

pub fn generate(
    function: &str,
    cases: &[StructuredCase],
    params: &[Param],
) -> Result<String, HarnessFault> {
    let mut calls = Vec::with_capacity(cases.len());
    let mut expected = Vec::with_capacity(cases.len());

    for (idx, case) in cases.iter().enumerate() {
        if case.args.len() != params.len() {
            return Err(HarnessFault::ArityMismatch {
                index: idx,
                expected: params.len(),
                found: case.args.len(),
            });
        }
        case.args
            .iter()
            .chain(std::iter::once(&case.expected))
            .try_for_each(check_range)?;
        let args: Vec<String> = case
            .args
            .iter()
            .zip(params)
            .map(|(value, param)| argument(value, *param))
            .collect();

        calls.push(format!(
            "            case {}: return Main.{}({});",
            idx,
            function,
            args.join(", ")
        ));
        expected.push(format!(
            "            case {}: return {};",
            idx,
            literal(&case.expected)
        ));
    }

    Ok(format!(
        r#"import java.util.*;

public class Harness {{
    public static void main(String[] args) {{
        int total = {total};
        for (int i = 0; i < total; i++) {{
            try {{
                Object actual = runCase(i);
                Object expected = expectedCase(i);
                if (Objects.deepEquals(actual, expected)) {{
                    System.out.println("RESULT|" + i + "|PASS");
                }} else {{
                    System.out.println("RESULT|" + i + "|FAIL|" + stringify(actual) + "|" + stringify(expected));
                }}
            }} catch (Exception e) {{
                System.out.println("RESULT|" + i + "|ERROR|" + e.getClass().getSimpleName() + ":" + e.getMessage());
            }}
        }}
    }}

    static Object runCase(int idx) {{
        switch (idx) {{
{calls}
            default: return null;
        }}
    }}

    static Object expectedCase(int idx) {{
        switch (idx) {{
{expected}
            default: return null;
        }}
    }}

    static String stringify(Object o) {{
        if (o == null) return "null";
        if (o.getClass().isArray()) {{
            if (o instanceof int[]) return Arrays.toString((int[]) o);
            if (o instanceof char[]) return Arrays.toString((char[]) o);
            if (o instanceof Object[]) return Arrays.deepToString((Object[]) o);
        }}
        if (o instanceof Collection) return o.toString();
        return String.valueOf(o);
    }}
}}
"#,
        total = cases.len(),
        calls = calls.join("\n"),
        expected = expected.join("\n"),
    ))
}
