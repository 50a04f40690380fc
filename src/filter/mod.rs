//! Selector expressions
//!
//! A selector is `PATTERN`, or `PATTERN OP OPERAND` where `OP` is one of
//! `~= == != >= <= > < @@ ~@ :`. The pattern picks paths, the optional
//! condition then filters them by the value found at each path.

pub mod operator;
pub mod pattern;
pub mod selector;

pub use operator::{split_expression, Operator, OPERATORS};
pub use pattern::{FilterMode, PathPattern};
pub use selector::{select_paths, Selector};
