//! anvil-merge: merge delimited tables by a key column
//!
//! Usage:
//!   # Merge two CSVs on the Name column, first value wins on conflict
//!   anvil-merge people.csv more_people.csv -o merged.csv
//!
//!   # Merge on Id, joining conflicting cells, and write JSON
//!   anvil-merge -k Id --conflict append a.csv b.csv -o merged.json

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anvil::expand_paths;
use anvil::merge::{self, Conflict, Table};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "anvil-merge")]
#[command(about = "Merge delimited tables by a key column", long_about = None)]
struct Args {
    /// Input files (glob patterns are expanded)
    #[arg(value_name = "IN", required = true)]
    inputs: Vec<PathBuf>,

    /// Key column rows are merged on
    #[arg(short = 'k', long = "key", default_value = merge::DEFAULT_KEY)]
    key: String,

    /// Output file; .json writes JSON, .txt writes tab-delimited
    #[arg(short = 'o', long = "output", value_name = "OUT")]
    output: Option<PathBuf>,

    /// Suffix appended to the first input path when no output is given
    #[arg(long, default_value = ".x.csv")]
    suffix: String,

    /// Field delimiter
    #[arg(short = 'd', long = "delim", default_value = merge::DEFAULT_DELIM)]
    delim: String,

    /// What to do when tables disagree: keep, override, append or longer
    #[arg(long, default_value = "keep")]
    conflict: Conflict,

    /// Verbose logging (-v reports conflicts)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose > 0 { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let inputs = expand_paths(&args.inputs)?;
    let output = args.output.clone().unwrap_or_else(|| {
        let mut out = inputs[0].clone().into_os_string();
        out.push(&args.suffix);
        PathBuf::from(out)
    });

    let tables = inputs
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(merge::parse_table(&text, &args.key, &args.delim, &path.display().to_string())?)
        })
        .collect::<Result<Vec<Table>>>()?;

    let columns = merge::merge_columns(tables.iter().map(|t| t.columns.as_slice()));
    let rows = merge::merge_tables(&tables, &columns, &args.key, args.conflict);
    info!("Merged {} tables into {} rows on '{}'", tables.len(), rows.len(), args.key);

    let rendered = merge::render_for(&output, &rows, &columns, &args.delim)?;
    std::fs::write(&output, rendered)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(())
}
