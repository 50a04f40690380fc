//! Trace events and the per-file run context they flow through.

use crate::edit::command::CommandKind;
use serde::Serialize;
use std::fmt;

/// Outcome of one command at one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStatus {
    Ok,
    Error(String),
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Ok => f.write_str("OK"),
            MatchStatus::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A command is about to run against the current record.
    Command {
        index: usize,
        command: CommandKind,
        selector: String,
    },
    /// The command was applied at one selected path.
    Match { path: String, status: MatchStatus },
    /// `key_echo` output.
    Echo { path: String, value: String },
}

impl TraceEvent {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            TraceEvent::Match {
                status: MatchStatus::Error(_),
                ..
            }
        )
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Command {
                index,
                command,
                selector,
            } => write!(f, "({:02}) {}({})", index, command, selector),
            TraceEvent::Match { path, status } => write!(f, "\tMatch: {} ({})", path, status),
            TraceEvent::Echo { path, value } => write!(f, "{}={}", path, value),
        }
    }
}

/// Receives trace events along with where they came from.
pub trait TraceSink {
    fn emit(&mut self, file: &str, record: usize, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn emit(&mut self, _file: &str, _record: usize, event: TraceEvent) {
        self.push(event);
    }
}

/// Counters for one input file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Records read
    pub input: usize,
    /// Records written
    pub output: usize,
    /// Records removed by `line_strip`
    pub dropped: usize,
    /// Per-path failures across all records
    pub path_errors: usize,
}

/// State threaded through the pipeline while one file is processed.
pub struct RunContext<'s> {
    file: String,
    record: usize,
    pub stats: RunStats,
    sink: &'s mut dyn TraceSink,
}

impl<'s> RunContext<'s> {
    pub fn new(file: impl Into<String>, sink: &'s mut dyn TraceSink) -> Self {
        RunContext {
            file: file.into(),
            record: 0,
            stats: RunStats::default(),
            sink,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Index of the record currently being edited.
    pub fn record(&self) -> usize {
        self.record
    }

    pub fn set_record(&mut self, record: usize) {
        self.record = record;
    }

    pub fn emit(&mut self, event: TraceEvent) {
        if event.is_error() {
            self.stats.path_errors += 1;
        }
        self.sink.emit(&self.file, self.record, event);
    }
}
