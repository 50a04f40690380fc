use crate::error::Result;
use crate::filter::operator::{split_expression, Operator};
use crate::filter::pattern::{FilterMode, PathPattern};
use crate::path::{self, all_paths, JsonPath};
use serde_json::Value;
use std::fmt;

/// A compiled selector: an optional path pattern plus an optional value
/// condition. Built once and shared by every record of a run.
#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    pattern: Option<PathPattern>,
    condition: Option<(Operator, String)>,
}

impl Selector {
    pub fn compile(expr: &str, mode: FilterMode) -> Result<Self> {
        let (pattern_text, condition) = split_expression(expr);

        let pattern = if pattern_text.is_empty() {
            None
        } else {
            Some(PathPattern::compile(pattern_text, mode)?)
        };

        Ok(Selector {
            source: expr.to_string(),
            pattern,
            condition: condition.map(|(op, operand)| (op, operand.to_string())),
        })
    }

    /// The expression this selector was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn operator(&self) -> Option<Operator> {
        self.condition.as_ref().map(|(op, _)| *op)
    }

    pub fn operand(&self) -> Option<&str> {
        self.condition.as_ref().map(|(_, operand)| operand.as_str())
    }

    fn path_matches(&self, path: &str) -> bool {
        self.pattern.as_ref().map_or(true, |p| p.matches(path))
    }

    /// Paths of `value` matching the path pattern and, when present, the
    /// value condition. Returned in pre-order.
    pub fn select(&self, value: &Value) -> Vec<String> {
        all_paths(value)
            .filter(|p| self.path_matches(p))
            .filter(|p| match &self.condition {
                None => true,
                Some((op, operand)) => path::get(value, &JsonPath::parse(p))
                    .is_some_and(|found| op.test(found, operand)),
            })
            .collect()
    }

    /// Paths matching the path pattern alone; the condition is ignored.
    pub fn select_by_path(&self, value: &Value) -> Vec<String> {
        all_paths(value).filter(|p| self.path_matches(p)).collect()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile `expr` with the default wildpath mode and select from `value`.
pub fn select_paths(value: &Value, expr: &str) -> Result<Vec<String>> {
    Ok(Selector::compile(expr, FilterMode::default())?.select(value))
}
