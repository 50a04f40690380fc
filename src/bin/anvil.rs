//! anvil: apply path-addressed edit commands to JSON log files
//!
//! Usage:
//!   # Strip a key and sort an array, writing access.log.x.json
//!   anvil --ks headers.cookie --asort tags access.log
//!
//!   # Run a command script first, then drop debug lines, one record per line
//!   anvil -c cleanup.cmd --ls 'level==debug' -b none app.log -o app.clean.json
//!
//!   # Trace every command and matched path
//!   anvil -t --kurl request.url access.log

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anvil::edit::{CommandKind, CommandSpec, Pipeline, TraceEvent, TraceSink};
use anvil::script::load_script;
use anvil::{edit_file, expand_paths, Beautify, EditConfig, FilterMode};
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "anvil")]
#[command(about = "Apply path-addressed edit commands to JSON log files", long_about = None)]
struct Args {
    /// Input files (glob patterns are expanded)
    #[arg(value_name = "IN", required = true)]
    inputs: Vec<PathBuf>,

    /// Output file, once per input (default: input path plus --suffix)
    #[arg(short = 'o', long = "output", value_name = "OUT")]
    outputs: Vec<PathBuf>,

    /// Suffix appended to input paths when no output is given
    #[arg(long, default_value = ".x.json")]
    suffix: String,

    /// Load commands from a script, applied before all command-line commands
    #[arg(short = 'c', long = "cmd", value_name = "CMD")]
    cmd_files: Vec<PathBuf>,

    /// Echo the value at each selected path
    #[arg(long = "key-echo", visible_alias = "kecho", value_name = "SELECTOR", allow_hyphen_values = true)]
    key_echo: Vec<String>,

    /// Expand an embedded JSON string into its contents
    #[arg(long = "key-expand", visible_alias = "ke", value_name = "SELECTOR", allow_hyphen_values = true)]
    key_expand: Vec<String>,

    /// Expand a URL string into its components
    #[arg(long = "key-expand-url", visible_alias = "kurl", value_name = "SELECTOR", allow_hyphen_values = true)]
    key_expand_url: Vec<String>,

    /// Percent-decode a string
    #[arg(long = "key-unquote", visible_alias = "kunq", value_name = "SELECTOR", allow_hyphen_values = true)]
    key_unquote: Vec<String>,

    /// Drop records where the selector matches
    #[arg(long = "line-strip", visible_alias = "ls", value_name = "SELECTOR", allow_hyphen_values = true)]
    line_strip: Vec<String>,

    /// Remove the selected keys
    #[arg(long = "key-strip", visible_alias = "ks", value_name = "SELECTOR", allow_hyphen_values = true)]
    key_strip: Vec<String>,

    /// Sort the selected arrays (PATTERN:KEY sorts objects by KEY)
    #[arg(long = "array-sort", visible_alias = "asort", value_name = "SELECTOR", allow_hyphen_values = true)]
    array_sort: Vec<String>,

    /// Output framing: none, array or dict
    #[arg(short = 'b', long, default_value = "array")]
    beautify: Beautify,

    /// Path matching: exact, icase, regexp or wildpath
    #[arg(long, default_value = "wildpath")]
    filter_mode: FilterMode,

    /// Trace every command and matched path to stdout
    #[arg(short = 't', long)]
    trace: bool,

    /// Verbose logging (-v info, -vv debug)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Prints echo lines always and trace lines when tracing is on.
struct ConsoleSink {
    trace: bool,
}

impl TraceSink for ConsoleSink {
    fn emit(&mut self, file: &str, record: usize, event: TraceEvent) {
        match event {
            TraceEvent::Echo { .. } => println!("{}", event),
            _ if self.trace => println!("{}[{:03}]\t{}", file, record, event),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = EditConfig {
        filter_mode: args.filter_mode,
        beautify: args.beautify,
        out_suffix: args.suffix.clone(),
        trace: args.trace,
    };
    debug!("Running with config: {}", serde_json::to_string(&config)?);

    let inputs = expand_paths(&args.inputs)?;
    let outputs = if args.outputs.is_empty() {
        inputs
            .iter()
            .map(|input| {
                let mut out = input.clone().into_os_string();
                out.push(&config.out_suffix);
                PathBuf::from(out)
            })
            .collect()
    } else {
        expand_paths(&args.outputs)?
    };
    if inputs.len() != outputs.len() {
        bail!(
            "must supply equal amounts of input files and output files (given {} input, {} output)",
            inputs.len(),
            outputs.len()
        );
    }

    let specs = build_specs(&args)?;
    let pipeline = Pipeline::compile(&specs, config.filter_mode)?;
    info!("Commands by order");
    for (index, command) in pipeline.commands().iter().enumerate() {
        info!("({:02}) {}", index, command);
    }

    let mut sink = ConsoleSink { trace: config.trace };
    for (input, output) in inputs.iter().zip(outputs.iter()) {
        info!("Processing \"{}\" --> \"{}\"", input.display(), output.display());
        let stats = edit_file(input, output, &pipeline, &config, &mut sink)?;
        info!("Input {} lines --> Output {} lines", stats.input, stats.output);
    }

    Ok(())
}

/// Script commands first, in file order, then command-line commands grouped
/// by command in declaration order.
fn build_specs(args: &Args) -> Result<Vec<CommandSpec>> {
    let mut specs = Vec::new();
    for path in expand_paths(&args.cmd_files)? {
        debug!("Command file: {}", path.display());
        specs.extend(load_script(&path)?);
    }

    let given = [
        (CommandKind::KeyEcho, &args.key_echo),
        (CommandKind::KeyExpand, &args.key_expand),
        (CommandKind::KeyExpandUrl, &args.key_expand_url),
        (CommandKind::KeyUnquote, &args.key_unquote),
        (CommandKind::LineStrip, &args.line_strip),
        (CommandKind::KeyStrip, &args.key_strip),
        (CommandKind::ArraySort, &args.array_sort),
    ];
    for (kind, selectors) in given {
        specs.extend(selectors.iter().map(|s| CommandSpec::new(kind, s.as_str())));
    }
    Ok(specs)
}
