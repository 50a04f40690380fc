use crate::error::AnvilError;
use crate::filter::FilterMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How edited records are framed in the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Beautify {
    /// One compact record per line
    None,
    /// A pretty-printed JSON array of records
    #[default]
    Array,
    /// A pretty-printed JSON object keyed by input record index
    Dict,
}

impl FromStr for Beautify {
    type Err = AnvilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Beautify::None),
            "array" => Ok(Beautify::Array),
            "dict" => Ok(Beautify::Dict),
            _ => Err(AnvilError::UnknownBeautify(s.to_string())),
        }
    }
}

impl fmt::Display for Beautify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Beautify::None => "none",
            Beautify::Array => "array",
            Beautify::Dict => "dict",
        };
        f.write_str(name)
    }
}

/// Configuration for an editing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditConfig {
    /// How selector path patterns are matched
    pub filter_mode: FilterMode,

    /// Output framing
    pub beautify: Beautify,

    /// Appended to each input path when no output path is given
    pub out_suffix: String,

    /// Emit per-command and per-path trace lines
    pub trace: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        EditConfig {
            filter_mode: FilterMode::default(),
            beautify: Beautify::default(),
            out_suffix: String::from(".x.json"),
            trace: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditConfig::default();
        assert_eq!(config.filter_mode, FilterMode::Wildpath);
        assert_eq!(config.beautify, Beautify::Array);
        assert_eq!(config.out_suffix, ".x.json");
        assert!(!config.trace);
    }

    #[test]
    fn test_config_serializes_modes_lowercase() {
        let json = serde_json::to_value(EditConfig::default()).unwrap();
        assert_eq!(json["filter_mode"], "wildpath");
        assert_eq!(json["beautify"], "array");
    }

    #[test]
    fn test_beautify_parse() {
        assert_eq!("DICT".parse::<Beautify>().unwrap(), Beautify::Dict);
        assert!("pretty".parse::<Beautify>().is_err());
    }
}
