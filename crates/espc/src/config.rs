//! Configuration loading.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Name of the configuration file looked up next to the working directory.
pub const CONFIG_FILE_NAME: &str = "espc.json";

/// An error loading an `espc.json` file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the config file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file was not valid JSON.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Translator configuration, loaded from `espc.json`.
///
/// Every field is optional; command-line flags take precedence over config
/// values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspcConfig {
    /// Statement that binds the `out` writer before the first write.
    #[serde(default)]
    pub out_init_statement: Option<String>,

    /// Extension of template files when scanning directories.
    #[serde(default)]
    pub extension: Option<String>,

    /// Extension given to translated files.
    #[serde(default)]
    pub output_extension: Option<String>,
}

impl EspcConfig {
    /// Loads configuration from `path`.
    ///
    /// `//` and `/* */` comments are tolerated, as hand-edited JSON config
    /// files tend to carry them.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let content = strip_json_comments(&content);
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Loads `espc.json` from `dir` if one exists.
    pub fn find(dir: &Utf8Path) -> Result<Option<(Utf8PathBuf, Self)>, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path).map(|config| Some((path, config)))
        } else {
            Ok(None)
        }
    }
}

/// Strips `//` and `/* */` comments from JSON text.
fn strip_json_comments(input: &str) -> String {
    enum Mode {
        Plain,
        InString,
        StringEscape,
        LineComment,
        BlockComment,
    }

    let mut mode = Mode::Plain;
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match mode {
            Mode::Plain => match c {
                '"' => {
                    mode = Mode::InString;
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    mode = Mode::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    mode = Mode::BlockComment;
                }
                _ => out.push(c),
            },
            Mode::InString => {
                out.push(c);
                mode = match c {
                    '\\' => Mode::StringEscape,
                    '"' => Mode::Plain,
                    _ => Mode::InString,
                };
            }
            Mode::StringEscape => {
                out.push(c);
                mode = Mode::InString;
            }
            Mode::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    mode = Mode::Plain;
                }
            }
            Mode::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Plain;
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments() {
        let json = r#"{
            // line comment
            "outInitStatement": "out=getOut();" /* block comment */
        }"#;
        let stripped = strip_json_comments(json);
        assert!(!stripped.contains("//"));
        assert!(!stripped.contains("/*"));
        assert!(stripped.contains("\"outInitStatement\""));
    }

    #[test]
    fn test_slashes_inside_strings_survive() {
        let json = r#"{"extension": ".esp", "note": "a//b /* c */"}"#;
        assert_eq!(strip_json_comments(json), json);
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let json = r#"{"outInitStatement": "out=say(\"hi\");"}"#;
        let config: EspcConfig = serde_json::from_str(&strip_json_comments(json)).unwrap();
        assert_eq!(config.out_init_statement.as_deref(), Some("out=say(\"hi\");"));
    }

    #[test]
    fn test_parse_camel_case_fields() {
        let json = r#"{
            "outInitStatement": "out=getOut();",
            "extension": ".ecma",
            "outputExtension": ".js"
        }"#;
        let config: EspcConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.out_init_statement.as_deref(), Some("out=getOut();"));
        assert_eq!(config.extension.as_deref(), Some(".ecma"));
        assert_eq!(config.output_extension.as_deref(), Some(".js"));
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config: EspcConfig = serde_json::from_str("{}").unwrap();
        assert!(config.out_init_statement.is_none());
        assert!(config.extension.is_none());
        assert!(config.output_extension.is_none());
    }
}
