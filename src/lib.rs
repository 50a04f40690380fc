//! # Anvil - path-addressed edits for JSON logs
//!
//! Applies an ordered pipeline of edit commands to every record of a
//! line-oriented JSON log. Each command selects paths inside the record
//! with a small filter language and edits the tree at each of them.
//!
//! ## Modules
//!
//! - **path**: dotted paths, get/set/delete, path enumeration
//! - **filter**: selector expressions (path patterns and value conditions)
//! - **edit**: the command set and the pipeline executor
//! - **script**: command scripts
//! - **files**: glob expansion of file arguments
//! - **merge**: key-based merging of delimited tables
//!
//! ## Quick Start
//!
//! ```rust
//! use anvil::edit::{apply_pipeline, CommandKind, CommandSpec, Pipeline};
//! use anvil::filter::FilterMode;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let specs = vec![
//!     CommandSpec::new(CommandKind::KeyStrip, "a.b"),
//!     CommandSpec::new(CommandKind::ArraySort, "c"),
//! ];
//! let pipeline = Pipeline::compile(&specs, FilterMode::Wildpath)?;
//!
//! let outcome = apply_pipeline(json!({"a": {"b": "1"}, "c": [3, 1, 2]}), &pipeline);
//! assert_eq!(outcome.value, Some(json!({"a": {}, "c": [1, 2, 3]})));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub mod config;
pub mod edit;
pub mod error;
pub mod files;
pub mod filter;
pub mod merge;
pub mod output;
pub mod path;
pub mod script;

// Re-export commonly used types for convenience
pub use config::{Beautify, EditConfig};
pub use edit::{apply_pipeline, CommandKind, CommandSpec, Outcome, Pipeline, RunContext, RunStats, TraceEvent, TraceSink};
pub use error::{AnvilError, PathError};
pub use files::expand_paths;
pub use filter::{select_paths, FilterMode, Selector};
pub use output::RecordWriter;
pub use path::{all_paths, JsonPath};

/// Decode one record, trying the SIMD parser before serde_json.
pub fn parse_record(line: &str) -> Result<Value> {
    let mut bytes = line.as_bytes().to_vec();
    match simd_json::serde::from_slice::<Value>(&mut bytes) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_str(line).context("Failed to parse JSON"),
    }
}

/// Main entry point: edit a stream of JSON lines into `writer`.
///
/// Blank lines are skipped. Counters accumulate in `ctx.stats`.
pub fn edit_json<R: BufRead, W: Write>(
    reader: R,
    writer: &mut RecordWriter<W>,
    pipeline: &Pipeline,
    ctx: &mut RunContext<'_>,
) -> Result<()> {
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        let value = parse_record(&line).with_context(|| format!("line {}", number + 1))?;

        let index = ctx.stats.input;
        ctx.set_record(index);
        ctx.stats.input += 1;

        if let Some(edited) = pipeline.apply(value, ctx) {
            writer.write_record(index, &edited)?;
            ctx.stats.output += 1;
        }
    }
    Ok(())
}

/// Edit one input file into one output file.
pub fn edit_file(
    input: &Path,
    output: &Path,
    pipeline: &Pipeline,
    config: &EditConfig,
    sink: &mut dyn TraceSink,
) -> Result<RunStats> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("Failed to open input: {}", input.display()))?,
    );
    let out = File::create(output)
        .with_context(|| format!("Failed to create output: {}", output.display()))?;
    let mut writer = RecordWriter::new(BufWriter::new(out), config.beautify)?;

    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut ctx = RunContext::new(name, sink);

    edit_json(reader, &mut writer, pipeline, &mut ctx)
        .with_context(|| format!("Failed to edit {}", input.display()))?;
    writer.finish()?;

    let stats = ctx.stats;
    info!(
        "{}: input {} records --> output {} records ({} dropped, {} path errors)",
        input.display(),
        stats.input,
        stats.output,
        stats.dropped,
        stats.path_errors
    );
    Ok(stats)
}
