//! Path pattern matching modes.

use crate::error::{AnvilError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the path part of a selector is matched against dotted paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// String equality
    Exact,
    /// Case-insensitive equality
    Icase,
    /// Full-match regular expression
    Regexp,
    /// `?` and `*` wildcards that never cross a `.`
    #[default]
    Wildpath,
}

impl FromStr for FilterMode {
    type Err = AnvilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(FilterMode::Exact),
            "icase" => Ok(FilterMode::Icase),
            "regexp" => Ok(FilterMode::Regexp),
            "wildpath" => Ok(FilterMode::Wildpath),
            _ => Err(AnvilError::UnknownFilterMode(s.to_string())),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterMode::Exact => "exact",
            FilterMode::Icase => "icase",
            FilterMode::Regexp => "regexp",
            FilterMode::Wildpath => "wildpath",
        };
        f.write_str(name)
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub enum PathPattern {
    Exact(String),
    /// Stored lowercased
    IgnoreCase(String),
    Regex(Regex),
}

impl PathPattern {
    pub fn compile(pattern: &str, mode: FilterMode) -> Result<Self> {
        let source = match mode {
            FilterMode::Exact => return Ok(PathPattern::Exact(pattern.to_string())),
            FilterMode::Icase => return Ok(PathPattern::IgnoreCase(pattern.to_lowercase())),
            FilterMode::Regexp => format!("^(?:{})$", pattern),
            FilterMode::Wildpath => wildpath_to_regex(pattern),
        };

        Regex::new(&source)
            .map(PathPattern::Regex)
            .map_err(|source| AnvilError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => p == path,
            PathPattern::IgnoreCase(p) => *p == path.to_lowercase(),
            PathPattern::Regex(re) => re.is_match(path),
        }
    }
}

/// Translate a wildpath pattern into an anchored regular expression.
///
/// `?` is one non-dot character and `*` is any run of them. A segment made
/// of a lone `*` still has to match something, so `a.*.c` rejects `a..c`.
pub fn wildpath_to_regex(pattern: &str) -> String {
    let segments: Vec<String> = pattern
        .split('.')
        .map(|segment| {
            if segment == "*" {
                return "[^.]+".to_string();
            }
            let mut out = String::with_capacity(segment.len() * 2);
            for c in segment.chars() {
                match c {
                    '?' => out.push_str("[^.]"),
                    '*' => out.push_str("[^.]*"),
                    other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
                }
            }
            out
        })
        .collect();
    format!("^{}$", segments.join(r"\."))
}
