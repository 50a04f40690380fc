//! Dotted paths and the get/set/delete primitives over `serde_json::Value`.
//!
//! Every edit takes the tree by value and hands back the new root. Callers
//! must use the returned value; the one passed in is consumed.

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// An ordered list of path segments. Object members are addressed by key,
/// array elements by their decimal index. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: Vec<String>,
}

impl JsonPath {
    pub fn root() -> Self {
        JsonPath::default()
    }

    /// Split dotted text into segments. The empty string is the root.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return JsonPath::root();
        }
        JsonPath {
            segments: text.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.into());
        JsonPath { segments }
    }

    /// The path without its last segment, or `None` for paths of one
    /// segment or less.
    pub fn parent(&self) -> Option<JsonPath> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(JsonPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl FromStr for JsonPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JsonPath::parse(s))
    }
}

impl From<&str> for JsonPath {
    fn from(s: &str) -> Self {
        JsonPath::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Parent of a dotted path string, or `None` when it has one segment or less.
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('.').map(|(head, _)| head)
}

/// Array index addressed by `segment`, if it is a plain decimal in range.
fn index_in(segment: &str, len: usize) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse::<usize>().ok().filter(|i| *i < len)
}

fn child_of<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => index_in(segment, items.len()).map(|i| &items[i]),
        _ => None,
    }
}

fn child_of_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => {
            let i = index_in(segment, items.len())?;
            Some(&mut items[i])
        }
        _ => None,
    }
}

/// Resolve `path` inside `value`. Absence at any level is `None`.
pub fn get<'a>(value: &'a Value, path: &JsonPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(value, |node, segment| child_of(node, segment))
}

fn get_mut<'a>(value: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    segments
        .iter()
        .try_fold(value, |node, segment| child_of_mut(node, segment))
}

/// Write `new` at `path`, creating empty objects for missing segments.
///
/// Arrays are descended only through in-range indices; any other non-object
/// node in the way is replaced by an empty object.
pub fn set(value: Value, path: &JsonPath, new: Value) -> Value {
    set_in(value, path.segments(), new)
}

fn set_in(node: Value, segments: &[String], new: Value) -> Value {
    let Some((first, rest)) = segments.split_first() else {
        return new;
    };

    match node {
        Value::Array(mut items) => match index_in(first, items.len()) {
            Some(i) => {
                let child = std::mem::take(&mut items[i]);
                items[i] = set_in(child, rest, new);
                Value::Array(items)
            }
            None => set_in(Value::Object(Map::new()), segments, new),
        },
        Value::Object(mut map) => {
            let slot = map
                .entry(first.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            let child = std::mem::take(slot);
            *slot = set_in(child, rest, new);
            Value::Object(map)
        }
        _ => set_in(Value::Object(Map::new()), segments, new),
    }
}

/// Remove the leaf at `path`. Unresolvable paths and the root leave the
/// value as it was.
pub fn delete(value: Value, path: &JsonPath) -> Value {
    let mut value = value;
    if let Some((last, parents)) = path.segments().split_last() {
        if let Some(container) = get_mut(&mut value, parents) {
            match container {
                Value::Object(map) => {
                    map.shift_remove(last.as_str());
                }
                Value::Array(items) => {
                    if let Some(i) = index_in(last, items.len()) {
                        items.remove(i);
                    }
                }
                _ => {}
            }
        }
    }
    value
}

/// True when every segment of a non-empty path resolves, through objects
/// and arrays alike.
pub fn has_path(value: &Value, path: &JsonPath) -> bool {
    !path.is_root() && get(value, path).is_some()
}

pub fn is_array(value: &Value, path: &JsonPath) -> bool {
    matches!(get(value, path), Some(Value::Array(_)))
}

/// Anything that is not an array or object is a leaf, including a path
/// that does not resolve at all.
pub fn is_leaf(value: &Value, path: &JsonPath) -> bool {
    !matches!(get(value, path), Some(Value::Array(_)) | Some(Value::Object(_)))
}
