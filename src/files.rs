//! File arguments: glob expansion and de-duplication.

use crate::error::Result;
use glob::glob;
use std::path::PathBuf;

/// Expand every argument as a glob pattern, in argument order, and drop
/// repeated paths. An argument that matches nothing is kept as written so
/// outputs that do not exist yet and missing inputs still reach the caller.
pub fn expand_paths(args: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::with_capacity(args.len());
    for arg in args {
        let Some(pattern) = arg.to_str() else {
            expanded.push(arg.clone());
            continue;
        };
        let mut matches = glob(pattern)?.collect::<std::result::Result<Vec<_>, _>>()?;
        if matches.is_empty() {
            expanded.push(arg.clone());
        } else {
            matches.sort();
            expanded.extend(matches);
        }
    }
    Ok(dedup(expanded))
}

/// Keep the first occurrence of each path, preserving order.
fn dedup(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = Vec::with_capacity(paths.len());
    for path in paths {
        if !seen.contains(&path) {
            seen.push(path);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let paths = ["b", "a", "b", "c", "a"].map(PathBuf::from).to_vec();
        assert_eq!(dedup(paths), ["b", "a", "c"].map(PathBuf::from).to_vec());
    }

    #[test]
    fn test_unmatched_argument_is_kept() {
        let args = [PathBuf::from("no/such/dir/out.json")];
        assert_eq!(expand_paths(&args).unwrap(), args.to_vec());
    }

    #[test]
    fn test_bad_pattern_is_an_error() {
        assert!(expand_paths(&[PathBuf::from("logs/[")]).is_err());
    }
}
