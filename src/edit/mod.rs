//! Edit commands and the pipeline that replays them on every record
//!
//! A pipeline is an ordered list of commands, each bound to a selector.
//! Commands see the record as left by the commands before them.

pub mod command;
pub mod pipeline;
pub mod trace;

pub use command::{Command, CommandKind, Edit, COMMANDS};
pub use pipeline::{apply_pipeline, CommandSpec, Outcome, Pipeline};
pub use trace::{MatchStatus, RunContext, RunStats, TraceEvent, TraceSink};
