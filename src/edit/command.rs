//! The closed set of edit commands and what each does at a single path.

use crate::error::{type_name, AnvilError, PathError};
use crate::filter::operator::text_of;
use crate::filter::{FilterMode, Operator, Selector};
use crate::path::{self, JsonPath};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    KeyEcho,
    KeyExpand,
    KeyExpandUrl,
    KeyUnquote,
    LineStrip,
    KeyStrip,
    ArraySort,
}

/// `(short name, long name, kind)` in declaration order. Commands given on
/// the command line are grouped in this order.
pub const COMMANDS: [(&str, &str, CommandKind); 7] = [
    ("kecho", "key_echo", CommandKind::KeyEcho),
    ("ke", "key_expand", CommandKind::KeyExpand),
    ("kurl", "key_expand_url", CommandKind::KeyExpandUrl),
    ("kunq", "key_unquote", CommandKind::KeyUnquote),
    ("ls", "line_strip", CommandKind::LineStrip),
    ("ks", "key_strip", CommandKind::KeyStrip),
    ("asort", "array_sort", CommandKind::ArraySort),
];

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::KeyEcho => "key_echo",
            CommandKind::KeyExpand => "key_expand",
            CommandKind::KeyExpandUrl => "key_expand_url",
            CommandKind::KeyUnquote => "key_unquote",
            CommandKind::LineStrip => "line_strip",
            CommandKind::KeyStrip => "key_strip",
            CommandKind::ArraySort => "array_sort",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            CommandKind::KeyEcho => "kecho",
            CommandKind::KeyExpand => "ke",
            CommandKind::KeyExpandUrl => "kurl",
            CommandKind::KeyUnquote => "kunq",
            CommandKind::LineStrip => "ls",
            CommandKind::KeyStrip => "ks",
            CommandKind::ArraySort => "asort",
        }
    }

    /// Look a command up by its short or long name. Dashes in long names
    /// are accepted in place of underscores.
    pub fn from_name(name: &str) -> Option<Self> {
        let long = name.replace('-', "_");
        COMMANDS
            .iter()
            .find(|(short, long_name, _)| *short == name || *long_name == long)
            .map(|(_, _, kind)| *kind)
    }
}

impl FromStr for CommandKind {
    type Err = AnvilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandKind::from_name(s).ok_or_else(|| AnvilError::UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A command bound to its compiled selector.
#[derive(Debug, Clone)]
pub struct Command {
    pub kind: CommandKind,
    pub selector: Selector,
}

/// What a command decided to do at one path.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Replace(Value),
    Remove,
    /// The value rendered for `key_echo`
    Echo(String),
    DropRecord,
}

impl Command {
    pub fn new(kind: CommandKind, selector: Selector) -> Self {
        Command { kind, selector }
    }

    pub fn compile(kind: CommandKind, expr: &str, mode: FilterMode) -> crate::error::Result<Self> {
        Ok(Command::new(kind, Selector::compile(expr, mode)?))
    }

    /// Paths this command visits on `value`, in the order it visits them.
    ///
    /// `array_sort` selects by path alone (its condition carries the sort
    /// key) and walks forward. Every other command walks the selection in
    /// reverse so deeper paths are edited before the paths that contain them.
    pub fn targets(&self, value: &Value) -> Vec<String> {
        match self.kind {
            CommandKind::ArraySort => self.selector.select_by_path(value),
            _ => {
                let mut paths = self.selector.select(value);
                paths.reverse();
                paths
            }
        }
    }

    fn sort_key(&self) -> Option<&str> {
        match (self.selector.operator(), self.selector.operand()) {
            (Some(Operator::Present), Some(key)) if !key.is_empty() => Some(key),
            _ => None,
        }
    }

    /// Decide the edit at `path` without touching the tree.
    pub fn plan(&self, value: &Value, path: &JsonPath) -> Result<Edit, PathError> {
        let target = path::get(value, path);
        match self.kind {
            CommandKind::KeyEcho => {
                let shown = target.map_or_else(|| "null".to_string(), |v| text_of(v).into_owned());
                Ok(Edit::Echo(shown))
            }
            CommandKind::KeyExpand => {
                let text = expect_str(target)?;
                Ok(Edit::Replace(serde_json::from_str(text)?))
            }
            CommandKind::KeyExpandUrl => Ok(Edit::Replace(expand_url(expect_str(target)?)?)),
            CommandKind::KeyUnquote => {
                let decoded = urlencoding::decode(expect_str(target)?)?;
                Ok(Edit::Replace(Value::String(decoded.into_owned())))
            }
            CommandKind::LineStrip => Ok(Edit::DropRecord),
            CommandKind::KeyStrip => Ok(Edit::Remove),
            CommandKind::ArraySort => match target {
                Some(Value::Array(items)) => Ok(Edit::Replace(Value::Array(sort_items(
                    items,
                    self.sort_key(),
                )?))),
                _ => Err(PathError::NotAnArray),
            },
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.selector)
    }
}

fn expect_str(value: Option<&Value>) -> Result<&str, PathError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        other => Err(PathError::NotAString(type_name(other))),
    }
}

/// Split a URL into `scheme`, `netloc`, `path`, `fragment` and one
/// `query.<key>` entry per query pair.
///
/// The text is split, never normalized: case, ports, dot segments and
/// spaces come through as written, and relative references are accepted.
/// Pairs split at the first `=`; a bare key gets the empty string and empty
/// pairs are skipped. Keys go through the path model, so dotted keys nest.
pub fn expand_url(text: &str) -> Result<Value, PathError> {
    let parts = UrlParts::split(text)?;

    let mut fields = Map::new();
    fields.insert("scheme".to_string(), Value::String(parts.scheme));
    fields.insert("netloc".to_string(), Value::String(parts.netloc.to_string()));
    fields.insert("path".to_string(), Value::String(parts.path.to_string()));
    fields.insert(
        "fragment".to_string(),
        Value::String(parts.fragment.to_string()),
    );

    let mut expanded = Value::Object(fields);
    for pair in parts.query.split('&').filter(|p| !p.is_empty()) {
        let (key, val) = pair.split_once('=').unwrap_or((pair, ""));
        let at = JsonPath::root().child("query");
        let at = key.split('.').fold(at, |at, segment| at.child(segment));
        expanded = path::set(expanded, &at, Value::String(val.to_string()));
    }
    Ok(expanded)
}

/// The five components of a URL reference, borrowed from the input.
#[derive(Debug, PartialEq)]
struct UrlParts<'a> {
    scheme: String,
    netloc: &'a str,
    path: &'a str,
    query: &'a str,
    fragment: &'a str,
}

impl<'a> UrlParts<'a> {
    /// `scheme:` first, then `//netloc` up to the next `/`, `?` or `#`,
    /// then the fragment, then the query. Whatever is left is the path.
    fn split(text: &'a str) -> Result<Self, PathError> {
        let (scheme, rest) = match text.split_once(':') {
            Some((scheme, rest)) if is_scheme(scheme) => (scheme.to_ascii_lowercase(), rest),
            _ => (String::new(), text),
        };

        let (netloc, rest) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find(['/', '?', '#']).unwrap_or(after.len());
                after.split_at(end)
            }
            None => ("", rest),
        };
        check_brackets(netloc)?;

        let (rest, fragment) = rest.split_once('#').unwrap_or((rest, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        Ok(UrlParts {
            scheme,
            netloc,
            path,
            query,
            fragment,
        })
    }
}

fn is_scheme(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// A bracketed host must be a well-formed IPv6 literal.
fn check_brackets(netloc: &str) -> Result<(), PathError> {
    let host = netloc.rsplit_once('@').map_or(netloc, |(_, host)| host);
    if !host.contains(['[', ']']) {
        return Ok(());
    }
    let literal = host.find(']').map_or(host, |end| &host[..=end]);
    url::Host::parse(literal)?;
    Ok(())
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null, booleans, numbers, strings, arrays,
/// objects; containers of the same type compare by their JSON text.
pub fn natural_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(0.0)
            .total_cmp(&y.as_f64().unwrap_or(0.0)),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            a.to_string().cmp(&b.to_string())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn sort_items(items: &[Value], key: Option<&str>) -> Result<Vec<Value>, PathError> {
    let Some(key) = key else {
        let mut sorted = items.to_vec();
        sorted.sort_by(natural_cmp);
        return Ok(sorted);
    };

    let mut keyed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let field = item.get(key).ok_or_else(|| PathError::MissingSortKey {
            index,
            key: key.to_string(),
        })?;
        keyed.push((text_of(field).into_owned(), item.clone()));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}
