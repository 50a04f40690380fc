//! Relational operators of the selector grammar.

use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `~=` case-insensitive equality
    EqualIgnoreCase,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `@@` substring
    Contains,
    /// `~@` case-insensitive substring
    ContainsIgnoreCase,
    /// `:` the path is selected whatever its value
    Present,
}

/// Tokens in lookup order. Two-character tokens come before the
/// single-character ones they contain.
pub const OPERATORS: [(&str, Operator); 10] = [
    ("~=", Operator::EqualIgnoreCase),
    ("==", Operator::Equal),
    ("!=", Operator::NotEqual),
    (">=", Operator::GreaterOrEqual),
    ("<=", Operator::LessOrEqual),
    (">", Operator::Greater),
    ("<", Operator::Less),
    ("@@", Operator::Contains),
    ("~@", Operator::ContainsIgnoreCase),
    (":", Operator::Present),
];

/// Split a selector expression into `(pattern, operator and operand)`.
///
/// The first table token found anywhere in the expression wins, and the
/// expression is cut at that token's rightmost occurrence.
pub fn split_expression(expr: &str) -> (&str, Option<(Operator, &str)>) {
    for (token, op) in OPERATORS {
        if let Some(at) = expr.rfind(token) {
            return (&expr[..at], Some((op, &expr[at + token.len()..])));
        }
    }
    (expr, None)
}

impl Operator {
    pub fn token(&self) -> &'static str {
        match self {
            Operator::EqualIgnoreCase => "~=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::Contains => "@@",
            Operator::ContainsIgnoreCase => "~@",
            Operator::Present => ":",
        }
    }

    /// Test a resolved value against the operand text.
    pub fn test(&self, value: &Value, operand: &str) -> bool {
        match self {
            Operator::EqualIgnoreCase => {
                text_of(value).to_lowercase() == operand.to_lowercase()
            }
            Operator::Equal => compare(value, operand) == Some(Ordering::Equal),
            Operator::NotEqual => compare(value, operand) != Some(Ordering::Equal),
            Operator::GreaterOrEqual => matches!(
                compare(value, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::LessOrEqual => matches!(
                compare(value, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Greater => compare(value, operand) == Some(Ordering::Greater),
            Operator::Less => compare(value, operand) == Some(Ordering::Less),
            Operator::Contains => text_of(value).contains(operand),
            Operator::ContainsIgnoreCase => text_of(value)
                .to_lowercase()
                .contains(&operand.to_lowercase()),
            Operator::Present => true,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Strings as they are, everything else as JSON text.
pub(crate) fn text_of(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Numbers compare numerically against numeric operands; everything else
/// compares by text.
fn compare(value: &Value, operand: &str) -> Option<Ordering> {
    match value {
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            match operand.trim().parse::<f64>() {
                Ok(rhs) => lhs.partial_cmp(&rhs),
                Err(_) => Some(value.to_string().as_str().cmp(operand)),
            }
        }
        other => Some(text_of(other).as_ref().cmp(operand)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_picks_longest_token_first() {
        assert_eq!(
            split_expression("status>=200"),
            ("status", Some((Operator::GreaterOrEqual, "200")))
        );
        assert_eq!(
            split_expression("name~@bob"),
            ("name", Some((Operator::ContainsIgnoreCase, "bob")))
        );
    }

    #[test]
    fn test_split_uses_rightmost_occurrence() {
        assert_eq!(
            split_expression("a==b==c"),
            ("a==b", Some((Operator::Equal, "c")))
        );
    }

    #[test]
    fn test_tokens_match_table() {
        for (token, op) in OPERATORS {
            assert_eq!(op.token(), token);
            assert_eq!(split_expression(&format!("p{}v", token)), ("p", Some((op, "v"))));
        }
    }

    #[test]
    fn test_split_without_operator() {
        assert_eq!(split_expression("a.*.c"), ("a.*.c", None));
        assert_eq!(split_expression("items:"), ("items", Some((Operator::Present, ""))));
    }

    #[test]
    fn test_numeric_comparison() {
        assert!(Operator::GreaterOrEqual.test(&json!(200), "200"));
        assert!(Operator::Greater.test(&json!(1000), "200"));
        assert!(Operator::Less.test(&json!(2.5), "10"));
        assert!(Operator::Equal.test(&json!(200), "200.0"));
        assert!(!Operator::Equal.test(&json!(201), "200"));
    }

    #[test]
    fn test_string_comparison_is_lexical() {
        assert!(Operator::Greater.test(&json!("b"), "a"));
        assert!(Operator::Less.test(&json!("100"), "20"));
        assert!(Operator::EqualIgnoreCase.test(&json!("GET"), "get"));
        assert!(Operator::NotEqual.test(&json!("GET"), "get"));
    }

    #[test]
    fn test_substring_operators() {
        assert!(Operator::Contains.test(&json!("/api/users"), "users"));
        assert!(!Operator::Contains.test(&json!("/api/users"), "USERS"));
        assert!(Operator::ContainsIgnoreCase.test(&json!("/api/users"), "USERS"));
        assert!(Operator::Contains.test(&json!(12345), "234"));
    }

    #[test]
    fn test_other_scalars_compare_by_text() {
        assert!(Operator::Equal.test(&json!(true), "true"));
        assert!(Operator::Equal.test(&json!(null), "null"));
        assert!(Operator::Present.test(&json!({"any": "thing"}), ""));
    }
}
