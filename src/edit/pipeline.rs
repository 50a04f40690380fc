use crate::edit::command::{Command, CommandKind, Edit};
use crate::edit::trace::{MatchStatus, RunContext, TraceEvent};
use crate::error::Result;
use crate::filter::{FilterMode, Selector};
use crate::path::{self, JsonPath};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// A command name paired with its raw selector text, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub selector: String,
}

impl CommandSpec {
    pub fn new(kind: CommandKind, selector: impl Into<String>) -> Self {
        CommandSpec {
            kind,
            selector: selector.into(),
        }
    }
}

/// An ordered, immutable list of commands replayed against every record.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    commands: Vec<Command>,
}

impl Pipeline {
    /// Compile every spec, in order. Identical selector strings are
    /// compiled once and shared.
    pub fn compile(specs: &[CommandSpec], mode: FilterMode) -> Result<Self> {
        let mut compiled: HashMap<&str, Selector> = HashMap::new();
        let mut commands = Vec::with_capacity(specs.len());

        for spec in specs {
            let selector = match compiled.get(spec.selector.as_str()) {
                Some(selector) => selector.clone(),
                None => {
                    let selector = Selector::compile(&spec.selector, mode)?;
                    compiled.insert(&spec.selector, selector.clone());
                    selector
                }
            };
            commands.push(Command::new(spec.kind, selector));
        }

        debug!(
            "Compiled pipeline of {} commands ({} distinct selectors)",
            commands.len(),
            compiled.len()
        );
        Ok(Pipeline { commands })
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Run every command, in order, on the current state of `value`.
    ///
    /// Returns `None` when a command dropped the record; the remaining
    /// commands are skipped.
    pub fn apply(&self, value: Value, ctx: &mut RunContext<'_>) -> Option<Value> {
        let mut value = value;
        for (index, command) in self.commands.iter().enumerate() {
            ctx.emit(TraceEvent::Command {
                index,
                command: command.kind,
                selector: command.selector.source().to_string(),
            });
            value = match apply_command(command, value, ctx) {
                Some(value) => value,
                None => {
                    ctx.stats.dropped += 1;
                    return None;
                }
            };
        }
        Some(value)
    }
}

/// Apply one command at each of its target paths. A failure at one path is
/// reported and leaves that path as it was.
fn apply_command(command: &Command, value: Value, ctx: &mut RunContext<'_>) -> Option<Value> {
    let mut value = value;

    for target in command.targets(&value) {
        let at = JsonPath::parse(&target);
        let status = match command.plan(&value, &at) {
            Ok(edit) => {
                match edit {
                    Edit::Replace(new) => value = path::set(value, &at, new),
                    Edit::Remove => value = path::delete(value, &at),
                    Edit::Echo(shown) => ctx.emit(TraceEvent::Echo {
                        path: target.clone(),
                        value: shown,
                    }),
                    Edit::DropRecord => {
                        ctx.emit(TraceEvent::Match {
                            path: target,
                            status: MatchStatus::Ok,
                        });
                        return None;
                    }
                }
                MatchStatus::Ok
            }
            Err(e) => {
                debug!(
                    "{}[{:03}] {} failed at '{}': {}",
                    ctx.file(),
                    ctx.record(),
                    command.kind,
                    target,
                    e
                );
                MatchStatus::Error(e.to_string())
            }
        };
        ctx.emit(TraceEvent::Match {
            path: target,
            status,
        });
    }

    Some(value)
}

/// The result of running a pipeline on one value outside a file run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// `None` when the record was dropped.
    pub value: Option<Value>,
    pub events: Vec<TraceEvent>,
}

/// Run `pipeline` on `value`, collecting every trace event.
pub fn apply_pipeline(value: Value, pipeline: &Pipeline) -> Outcome {
    let mut events = Vec::new();
    let mut ctx = RunContext::new("", &mut events);
    let value = pipeline.apply(value, &mut ctx);
    Outcome { value, events }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pipeline(specs: &[(CommandKind, &str)]) -> Pipeline {
        let specs: Vec<CommandSpec> = specs
            .iter()
            .map(|(kind, sel)| CommandSpec::new(*kind, *sel))
            .collect();
        Pipeline::compile(&specs, FilterMode::Wildpath).unwrap()
    }

    fn errors(outcome: &Outcome) -> usize {
        outcome.events.iter().filter(|e| e.is_error()).count()
    }

    #[test]
    fn test_strip_then_sort() {
        let p = pipeline(&[(CommandKind::KeyStrip, "a.b"), (CommandKind::ArraySort, "c")]);
        let out = apply_pipeline(json!({"a": {"b": "1"}, "c": [3, 1, 2]}), &p);
        assert_eq!(out.value, Some(json!({"a": {}, "c": [1, 2, 3]})));
        assert_eq!(errors(&out), 0);
    }

    #[test]
    fn test_expand_url_end_to_end() {
        let p = pipeline(&[(CommandKind::KeyExpandUrl, "u")]);
        let out = apply_pipeline(json!({"u": "http://h/p?x=1&y=2"}), &p);
        assert_eq!(
            out.value,
            Some(json!({"u": {
                "scheme": "http",
                "netloc": "h",
                "path": "/p",
                "fragment": "",
                "query": {"x": "1", "y": "2"}
            }}))
        );
    }

    #[test]
    fn test_line_strip_drops_and_skips_the_rest() {
        let p = pipeline(&[
            (CommandKind::LineStrip, "level==debug"),
            (CommandKind::KeyStrip, "msg"),
        ]);

        let out = apply_pipeline(json!({"level": "debug", "msg": "x"}), &p);
        assert_eq!(out.value, None);
        // no header for the skipped command
        let headers = out
            .events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Command { .. }))
            .count();
        assert_eq!(headers, 1);

        let kept = apply_pipeline(json!({"level": "info", "msg": "x"}), &p);
        assert_eq!(kept.value, Some(json!({"level": "info"})));
    }

    #[test]
    fn test_sort_on_non_array_reports_one_error() {
        let p = pipeline(&[(CommandKind::ArraySort, "c")]);
        let input = json!({"c": {"not": "array"}});
        let out = apply_pipeline(input.clone(), &p);
        assert_eq!(out.value, Some(input));
        assert_eq!(errors(&out), 1);
        assert!(out.events.contains(&TraceEvent::Match {
            path: "c".to_string(),
            status: MatchStatus::Error("path is not array".to_string()),
        }));
    }

    #[test]
    fn test_path_errors_are_isolated() {
        let p = pipeline(&[(CommandKind::KeyExpand, "*"), (CommandKind::KeyStrip, "drop")]);
        let out = apply_pipeline(
            json!({"good": "{\"n\": 1}", "bad": "{nope", "drop": 0}),
            &p,
        );
        assert_eq!(out.value, Some(json!({"good": {"n": 1}, "bad": "{nope"})));
        // "bad" fails to parse, "drop" is a number
        assert_eq!(errors(&out), 2);
    }

    #[test]
    fn test_later_commands_see_earlier_edits() {
        let p = pipeline(&[
            (CommandKind::KeyExpand, "payload"),
            (CommandKind::KeyStrip, "payload.secret"),
            (CommandKind::KeyUnquote, "payload.q"),
        ]);
        let out = apply_pipeline(
            json!({"payload": "{\"secret\": 1, \"q\": \"a%2Bb\"}"}),
            &p,
        );
        assert_eq!(out.value, Some(json!({"payload": {"q": "a+b"}})));
    }

    #[test]
    fn test_strip_every_array_element_in_reverse() {
        let p = pipeline(&[(CommandKind::KeyStrip, "items.*")]);
        let out = apply_pipeline(json!({"items": [1, 2, 3]}), &p);
        assert_eq!(out.value, Some(json!({"items": []})));
    }

    #[test]
    fn test_echo_event() {
        let p = pipeline(&[(CommandKind::KeyEcho, "user.name")]);
        let input = json!({"user": {"name": "ada"}});
        let out = apply_pipeline(input.clone(), &p);
        assert_eq!(out.value, Some(input));
        assert!(out.events.contains(&TraceEvent::Echo {
            path: "user.name".to_string(),
            value: "ada".to_string(),
        }));
    }

    #[test]
    fn test_dropped_counter() {
        let p = pipeline(&[(CommandKind::LineStrip, "*")]);
        let mut events = Vec::new();
        let mut ctx = RunContext::new("f", &mut events);
        assert_eq!(p.apply(json!({"a": 1}), &mut ctx), None);
        assert_eq!(p.apply(json!({}), &mut ctx), Some(json!({})));
        assert_eq!(ctx.stats.dropped, 1);
    }

    #[test]
    fn test_bad_regexp_fails_compilation() {
        let specs = vec![CommandSpec::new(CommandKind::KeyStrip, "a(")];
        assert!(Pipeline::compile(&specs, FilterMode::Regexp).is_err());
    }
}
