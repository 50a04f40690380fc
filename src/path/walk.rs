//! Lazy enumeration of every addressable path inside a value.

use serde_json::{map, Value};
use std::iter::Enumerate;
use std::slice;

enum Children<'a> {
    Object(map::Iter<'a>),
    Array(Enumerate<slice::Iter<'a, Value>>),
}

impl<'a> Children<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Children::Object(map.iter())),
            Value::Array(items) => Some(Children::Array(items.iter().enumerate())),
            _ => None,
        }
    }

    fn next_child(&mut self) -> Option<(String, &'a Value)> {
        match self {
            Children::Object(iter) => iter.next().map(|(k, v)| (k.clone(), v)),
            Children::Array(iter) => iter.next().map(|(i, v)| (i.to_string(), v)),
        }
    }
}

struct Frame<'a> {
    prefix: Option<String>,
    children: Children<'a>,
}

/// Depth-first, pre-order iterator over the dotted paths of a value.
///
/// A path is yielded before any of its descendants; siblings follow the
/// container's own order.
pub struct AllPaths<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> Iterator for AllPaths<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some((key, child)) = frame.children.next_child() else {
                self.stack.pop();
                continue;
            };

            let path = match &frame.prefix {
                Some(prefix) => format!("{}.{}", prefix, key),
                None => key,
            };

            if let Some(children) = Children::of(child) {
                self.stack.push(Frame {
                    prefix: Some(path.clone()),
                    children,
                });
            }
            return Some(path);
        }
    }
}

/// Every path reachable from `value`. Scalars have none.
pub fn all_paths(value: &Value) -> AllPaths<'_> {
    let stack = Children::of(value)
        .map(|children| Frame {
            prefix: None,
            children,
        })
        .into_iter()
        .collect();
    AllPaths { stack }
}
