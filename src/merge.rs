//! Key-based merging of delimited tables
//!
//! Rows from several tables are merged by the value of a key column. When
//! two tables disagree on a non-empty cell the [`Conflict`] policy decides.

use crate::error::{AnvilError, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_KEY: &str = "Name";
pub const DEFAULT_DELIM: &str = ",";
const APPEND_DELIM: &str = ";";

/// A row keyed by column name. `None` marks a cell no table filled in.
pub type Row = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conflict {
    /// Keep the value seen first
    #[default]
    Keep,
    /// Take the value seen last
    Override,
    /// Join both values with `;`
    Append,
    /// Take the longer value, the first on a tie
    Longer,
}

impl Conflict {
    fn resolve(&self, old: &str, new: &str) -> String {
        match self {
            Conflict::Keep => old.to_string(),
            Conflict::Override => new.to_string(),
            Conflict::Append => format!("{}{}{}", old, APPEND_DELIM, new),
            Conflict::Longer => {
                if old.len() >= new.len() {
                    old.to_string()
                } else {
                    new.to_string()
                }
            }
        }
    }
}

impl FromStr for Conflict {
    type Err = AnvilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(Conflict::Keep),
            "override" => Ok(Conflict::Override),
            "append" => Ok(Conflict::Append),
            "longer" => Ok(Conflict::Longer),
            _ => Err(AnvilError::UnknownConflict(s.to_string())),
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Conflict::Keep => "keep",
            Conflict::Override => "override",
            Conflict::Append => "append",
            Conflict::Longer => "longer",
        };
        f.write_str(name)
    }
}

/// One parsed input table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: BTreeMap<String, Row>,
}

/// Parse delimited text whose first line is the header. A later row with
/// the same key replaces an earlier one.
pub fn parse_table(text: &str, key_column: &str, delim: &str, origin: &str) -> Result<Table> {
    let mut lines = text.lines();
    let columns: Vec<String> = match lines.next() {
        Some(header) => header.trim().split(delim).map(str::to_string).collect(),
        None => return Ok(Table::default()),
    };
    if !columns.iter().any(|c| c == key_column) {
        return Err(AnvilError::MissingKeyColumn {
            file: origin.to_string(),
            column: key_column.to_string(),
        });
    }

    let mut rows = BTreeMap::new();
    for (number, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: Row = columns
            .iter()
            .cloned()
            .zip(line.split(delim).map(|cell| Some(cell.to_string())))
            .collect();
        match row.get(key_column).cloned().flatten() {
            Some(key) => {
                rows.insert(key, row);
            }
            None => warn!("{}: row {} has no '{}' cell, skipped", origin, number + 2, key_column),
        }
    }

    Ok(Table { columns, rows })
}

/// Union of all header columns, in the order first seen.
pub fn merge_columns<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut all = Vec::new();
    for header in headers {
        for column in header {
            if !all.contains(column) {
                all.push(column.clone());
            }
        }
    }
    all
}

fn filled<'r>(row: &'r Row, column: &str) -> Option<&'r str> {
    row.get(column)
        .and_then(|cell| cell.as_deref())
        .filter(|cell| !cell.is_empty())
}

/// Merge `new` into `old` over `columns`.
pub fn merge_row(old: &Row, new: &Row, columns: &[String], key_column: &str, conflict: Conflict) -> Row {
    columns
        .iter()
        .map(|column| {
            let value = match (filled(old, column), filled(new, column)) {
                (Some(a), Some(b)) if a != b => {
                    let resolved = conflict.resolve(a, b);
                    if column != key_column {
                        info!(
                            "[CONFLICT] For {}=\"{}\" in column {}: [\"{}\",\"{}\"] --> {}",
                            key_column,
                            filled(old, key_column).unwrap_or(""),
                            column,
                            a,
                            b,
                            resolved
                        );
                    }
                    Some(resolved)
                }
                (Some(a), _) => Some(a.to_string()),
                (None, Some(b)) => Some(b.to_string()),
                (None, None) => None,
            };
            (column.clone(), value)
        })
        .collect()
}

/// Merge the rows of every table, in table order.
pub fn merge_tables(tables: &[Table], columns: &[String], key_column: &str, conflict: Conflict) -> BTreeMap<String, Row> {
    let mut merged: BTreeMap<String, Row> = BTreeMap::new();
    for table in tables {
        for (key, row) in &table.rows {
            let slot = merged.entry(key.clone()).or_default();
            *slot = merge_row(slot, row, columns, key_column, conflict);
        }
    }
    merged
}

/// Rows as a pretty JSON object keyed by row key.
pub fn to_json(rows: &BTreeMap<String, Row>) -> anyhow::Result<String> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    rows.serialize(&mut ser)?;
    Ok(String::from_utf8(out)?)
}

/// Rows as delimited text sorted by key. Every cell, header cells included,
/// is followed by the delimiter.
pub fn to_delimited(rows: &BTreeMap<String, Row>, columns: &[String], delim: &str) -> String {
    let mut out = String::new();
    for column in columns {
        out.push_str(column);
        out.push_str(delim);
    }
    out.push('\n');
    for row in rows.values() {
        for column in columns {
            out.push_str(row.get(column).and_then(|c| c.as_deref()).unwrap_or(""));
            out.push_str(delim);
        }
        out.push('\n');
    }
    out
}

/// Render for `output`: `.json` as JSON, `.txt` tab-delimited, anything
/// else with `delim`.
pub fn render_for(output: &Path, rows: &BTreeMap<String, Row>, columns: &[String], delim: &str) -> anyhow::Result<String> {
    match output.extension().and_then(|e| e.to_str()) {
        Some("json") => to_json(rows),
        Some("txt") => Ok(to_delimited(rows, columns, "\t")),
        _ => Ok(to_delimited(rows, columns, delim)),
    }
}
