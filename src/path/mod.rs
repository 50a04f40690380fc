//! Path addressing over JSON trees
//!
//! A path is a dotted string such as `request.headers.0.name`. This module
//! resolves, writes and removes values at such paths and enumerates every
//! path a value contains.

pub mod model;
pub mod walk;

pub use model::{delete, get, has_path, is_array, is_leaf, parent, set, JsonPath};
pub use walk::{all_paths, AllPaths};
