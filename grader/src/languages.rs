//! Language configuration for compilation and execution

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::GradeError;

/// Language families the engine knows how to normalize and grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Cpp,
    Java,
    Python,
}

impl Language {
    /// Canonical name, also the key used in `languages.toml` and in
    /// per-problem method signatures.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Python => "python",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "cpp" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            "python" => Some(Language::Python),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build and run commands for one program inside a workspace
#[derive(Debug, Clone)]
pub struct BuildSpec {
    /// Name of the source file (e.g., "main.cpp")
    pub source_file: String,
    /// Compile command (None if not needed)
    pub compile_command: Option<Vec<String>>,
    /// Run command
    pub run_command: Vec<String>,
}

/// Configuration for a supported programming language
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub language: Language,
    /// How a plain candidate program is built and run
    pub program: BuildSpec,
    /// Whether the memory ceiling is enforced through the address-space rlimit
    pub limit_address_space: bool,
    /// How the structured-testing harness is built and run, if supported
    pub harness: Option<BuildSpec>,
}

/// Raw TOML configuration for a build/run pair
#[derive(Debug, Deserialize)]
struct RawBuildSpec {
    source_file: String,
    compile_command: Option<String>,
    run_command: String,
}

impl RawBuildSpec {
    fn into_spec(self) -> BuildSpec {
        BuildSpec {
            source_file: self.source_file,
            compile_command: self.compile_command.map(|cmd| into_command(&cmd)),
            run_command: into_command(&self.run_command),
        }
    }
}

/// Raw TOML configuration for a language
#[derive(Debug, Deserialize)]
struct RawLanguageConfig {
    #[serde(flatten)]
    program: RawBuildSpec,
    #[serde(default = "default_limit_address_space")]
    limit_address_space: bool,
    #[serde(default)]
    aliases: Vec<String>,
    harness: Option<RawBuildSpec>,
}

fn default_limit_address_space() -> bool {
    true
}

const DEFAULT_LANGUAGES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/files/languages.toml"));

/// Language table keyed by lowercase name and alias
#[derive(Debug, Clone)]
pub struct LanguageTable {
    languages: HashMap<String, LanguageConfig>,
}

impl LanguageTable {
    /// Load the table embedded at build time
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_toml(DEFAULT_LANGUAGES)
    }

    /// Load a replacement table from disk
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read language config {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let raw_configs: HashMap<String, RawLanguageConfig> = toml::from_str(content)?;

        let mut languages = HashMap::new();

        for (name, raw) in raw_configs {
            let key = name.to_lowercase();
            let language = Language::from_key(&key)
                .with_context(|| format!("Unknown language family in config: {}", name))?;

            let program = raw.program.into_spec();
            if program.run_command.is_empty() {
                anyhow::bail!("Empty run command for {}", name);
            }

            let config = LanguageConfig {
                language,
                program,
                limit_address_space: raw.limit_address_space,
                harness: raw.harness.map(RawBuildSpec::into_spec),
            };

            // Add main language name
            languages.insert(key, config.clone());

            // Add aliases
            for alias in raw.aliases {
                languages.insert(alias.trim().to_lowercase(), config.clone());
            }
        }

        Ok(Self { languages })
    }

    /// Get language configuration by free-text language name
    pub fn get(&self, language: &str) -> Option<&LanguageConfig> {
        self.languages.get(&language.trim().to_lowercase())
    }

    /// Like [`LanguageTable::get`], failing with `UnsupportedLanguage`
    pub fn resolve(&self, language: &str) -> Result<&LanguageConfig, GradeError> {
        self.get(language)
            .ok_or_else(|| GradeError::UnsupportedLanguage(language.to_string()))
    }
}

fn into_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table_resolves_aliases() {
        let table = LanguageTable::embedded().unwrap();

        assert_eq!(table.get("C++").unwrap().language, Language::Cpp);
        assert_eq!(table.get("c").unwrap().language, Language::Cpp);
        assert_eq!(table.get(" Py ").unwrap().language, Language::Python);
        assert_eq!(table.get("JAVA").unwrap().language, Language::Java);
        assert!(table.get("brainfuck").is_none());
    }

    #[test]
    fn test_structured_support() {
        let table = LanguageTable::embedded().unwrap();

        assert!(table.get("cpp").unwrap().harness.is_none());
        assert!(table.get("java").unwrap().harness.is_some());
        assert!(table.get("python").unwrap().harness.is_some());
        assert!(!table.get("java").unwrap().limit_address_space);
    }

    #[test]
    fn test_resolve_unsupported() {
        let table = LanguageTable::embedded().unwrap();
        let err = table.resolve("cobol").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported language: cobol");
    }

    #[test]
    fn test_load_languages() {
        let table = LanguageTable::from_toml(
            r#"
[cpp]
source_file = "main.cpp"
compile_command = "g++ -o main main.cpp"
run_command = "./main"

[python]
source_file = "main.py"
run_command = "python3 main.py"
aliases = ["py", "python3"]
"#,
        )
        .unwrap();

        let cpp = table.get("cpp").unwrap();
        assert_eq!(
            cpp.program.compile_command.as_deref(),
            Some(&["g++", "-o", "main", "main.cpp"].map(String::from)[..])
        );
        assert!(cpp.limit_address_space);
        assert!(table.get("python3").unwrap().harness.is_none());
    }

    #[test]
    fn test_unknown_family_rejected() {
        let result = LanguageTable::from_toml(
            r#"
[rust]
source_file = "main.rs"
run_command = "./main"
"#,
        );
        assert!(result.is_err());
    }
}
