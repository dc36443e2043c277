//! Boilerplate injection
//!
//! Contest code often leans on headers and imports the author never wrote.
//! These rewrites only add missing declarations; they never touch the
//! candidate's own lines.

use crate::languages::Language;

const CPP_INCLUDE_LINE: &str = "#include <bits/stdc++.h>";
const JAVA_IMPORT_LINE: &str = "import java.util.*;";
const PYTHON_TYPING_LINE: &str = "from typing import List";

/// Add the declarations `language` commonly needs but `code` lacks
pub fn normalize(language: Language, code: &str) -> String {
    match language {
        Language::Cpp => ensure_cpp_includes(code),
        Language::Java => ensure_java_imports(code),
        Language::Python => ensure_python_imports(code),
    }
}

fn ensure_cpp_includes(code: &str) -> String {
    if code.contains(CPP_INCLUDE_LINE) {
        return code.to_string();
    }
    if code.starts_with("#include") {
        format!("{}\n{}", CPP_INCLUDE_LINE, code)
    } else {
        format!("{}\n\n{}", CPP_INCLUDE_LINE, code)
    }
}

fn ensure_java_imports(code: &str) -> String {
    if code.contains("import java.util") {
        return code.to_string();
    }

    let mut lines: Vec<&str> = code.lines().collect();

    // Insert after the package/import preamble, blank lines included
    let insert_at = lines
        .iter()
        .position(|line| {
            let stripped = line.trim();
            !(stripped.is_empty()
                || stripped.starts_with("package ")
                || stripped.starts_with("import "))
        })
        .unwrap_or(lines.len());

    lines.insert(insert_at, JAVA_IMPORT_LINE);

    let mut out = lines.join("\n");
    if code.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn ensure_python_imports(code: &str) -> String {
    if code.contains("List[")
        && !code.contains("from typing import")
        && !code.contains("import typing")
    {
        return format!("{}\n\n{}", PYTHON_TYPING_LINE, code);
    }
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpp_prepends_before_includes() {
        let code = "#include <iostream>\nint main() {}\n";
        assert_eq!(
            normalize(Language::Cpp, code),
            "#include <bits/stdc++.h>\n#include <iostream>\nint main() {}\n"
        );
    }

    #[test]
    fn test_cpp_without_includes_gets_blank_line() {
        assert_eq!(
            normalize(Language::Cpp, "int main() {}"),
            "#include <bits/stdc++.h>\n\nint main() {}"
        );
    }

    #[test]
    fn test_cpp_already_included() {
        let code = "#include <bits/stdc++.h>\nint main() {}";
        assert_eq!(normalize(Language::Cpp, code), code);
    }

    #[test]
    fn test_java_import_after_package() {
        let code = "package foo;\n\nimport java.io.*;\npublic class Main {}\n";
        assert_eq!(
            normalize(Language::Java, code),
            "package foo;\n\nimport java.io.*;\nimport java.util.*;\npublic class Main {}\n"
        );
    }

    #[test]
    fn test_java_import_at_top() {
        assert_eq!(
            normalize(Language::Java, "public class Main {}"),
            "import java.util.*;\npublic class Main {}"
        );
    }

    #[test]
    fn test_java_existing_import_untouched() {
        let code = "import java.util.List;\npublic class Main {}";
        assert_eq!(normalize(Language::Java, code), code);
    }

    #[test]
    fn test_python_typing_import() {
        let code = "def f(a: List[int]) -> int:\n    return 0\n";
        assert_eq!(
            normalize(Language::Python, code),
            format!("from typing import List\n\n{}", code)
        );

        let typed = "from typing import List\ndef f(a: List[int]): pass";
        assert_eq!(normalize(Language::Python, typed), typed);

        let plain = "print(1)";
        assert_eq!(normalize(Language::Python, plain), plain);
    }
}
