//! Error types for pipeline construction and per-path edits.

use thiserror::Error;

/// Errors raised while building a pipeline or resolving file arguments.
/// Any of these aborts the run before a single record is touched.
#[derive(Error, Debug)]
pub enum AnvilError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Unknown filter mode '{0}' (expected exact, icase, regexp or wildpath)")]
    UnknownFilterMode(String),

    #[error("Unknown beautify mode '{0}' (expected none, array or dict)")]
    UnknownBeautify(String),

    #[error("Invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{file}:{line}: expected a command flag, found '{text}'")]
    UnexpectedScriptLine {
        file: String,
        line: usize,
        text: String,
    },

    #[error("{file}: command '{command}' is missing its selector line")]
    MissingSelector { file: String, command: String },

    #[error("Unknown conflict policy '{0}' (expected keep, override, append or longer)")]
    UnknownConflict(String),

    #[error("{file}: key column '{column}' not found in header")]
    MissingKeyColumn { file: String, column: String },

    #[error("glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("glob walk: {0}")]
    Glob(#[from] glob::GlobError),
}

/// A failure applying one command at one path. The record keeps its
/// previous value at that path and processing continues.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("path is not array")]
    NotAnArray,

    #[error("expected a string value, found {0}")]
    NotAString(&'static str),

    #[error("malformed embedded JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("malformed URL: {0}")]
    MalformedUrl(#[from] url::ParseError),

    #[error("invalid percent-encoding: {0}")]
    InvalidPercentEncoding(#[from] std::string::FromUtf8Error),

    #[error("array element {index} has no key '{key}'")]
    MissingSortKey { index: usize, key: String },
}

pub type Result<T> = std::result::Result<T, AnvilError>;

/// Short name of a value's JSON type, for error messages.
pub(crate) fn type_name(value: Option<&serde_json::Value>) -> &'static str {
    use serde_json::Value;
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}
