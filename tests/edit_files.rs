use anvil::edit::{CommandKind, CommandSpec, Pipeline, TraceEvent};
use anvil::script::{load_script, parse_script};
use anvil::{edit_file, expand_paths, select_paths, Beautify, EditConfig, FilterMode};
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;

fn write_log(dir: &std::path::Path, name: &str, records: &[Value]) -> std::path::PathBuf {
    let path = dir.join(name);
    let text: String = records.iter().map(|r| format!("{}\n", r)).collect();
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_script_then_command_line_order() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("clean.cmd");
    fs::write(&script, "-ke\npayload\n--key_strip\npayload.token\n").unwrap();

    let mut specs = load_script(&script).unwrap();
    specs.push(CommandSpec::new(CommandKind::ArraySort, "payload.ids"));
    let pipeline = Pipeline::compile(&specs, FilterMode::Wildpath).unwrap();

    let input = write_log(
        dir.path(),
        "app.log",
        &[json!({"payload": "{\"token\": \"t\", \"ids\": [3, 1, 2]}"})],
    );
    let output = dir.path().join("app.log.x.json");
    let config = EditConfig {
        beautify: Beautify::None,
        ..EditConfig::default()
    };

    let mut events: Vec<TraceEvent> = Vec::new();
    let stats = edit_file(&input, &output, &pipeline, &config, &mut events).unwrap();
    assert_eq!(stats.input, 1);
    assert_eq!(stats.output, 1);

    let written: Value = serde_json::from_str(fs::read_to_string(&output).unwrap().trim()).unwrap();
    assert_eq!(written, json!({"payload": {"ids": [1, 2, 3]}}));
}

#[test]
fn test_line_strip_counts_dropped_not_input() {
    let dir = tempdir().unwrap();
    let specs = parse_script("-ls\nlevel==debug\n", "inline").unwrap();
    let pipeline = Pipeline::compile(&specs, FilterMode::Wildpath).unwrap();

    let input = write_log(
        dir.path(),
        "svc.log",
        &[
            json!({"level": "info", "n": 1}),
            json!({"level": "debug", "n": 2}),
            json!({"level": "warn", "n": 3}),
        ],
    );
    let output = dir.path().join("svc.out.json");
    let config = EditConfig {
        beautify: Beautify::Dict,
        ..EditConfig::default()
    };

    let mut events: Vec<TraceEvent> = Vec::new();
    let stats = edit_file(&input, &output, &pipeline, &config, &mut events).unwrap();
    assert_eq!((stats.input, stats.output, stats.dropped), (3, 2, 1));

    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({"0": {"level": "info", "n": 1}, "2": {"level": "warn", "n": 3}})
    );
}

#[test]
fn test_path_errors_are_counted_per_file() {
    let dir = tempdir().unwrap();
    let specs = vec![CommandSpec::new(CommandKind::ArraySort, "items")];
    let pipeline = Pipeline::compile(&specs, FilterMode::Wildpath).unwrap();

    let input = write_log(
        dir.path(),
        "mixed.log",
        &[json!({"items": [2, 1]}), json!({"items": "nope"})],
    );
    let output = dir.path().join("mixed.out.json");

    let mut events: Vec<TraceEvent> = Vec::new();
    let stats = edit_file(&input, &output, &pipeline, &EditConfig::default(), &mut events).unwrap();
    assert_eq!(stats.path_errors, 1);
    assert_eq!(stats.output, 2);

    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written, json!([{"items": [1, 2]}, {"items": "nope"}]));
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::default();
    let mut events: Vec<TraceEvent> = Vec::new();
    let result = edit_file(
        &dir.path().join("absent.log"),
        &dir.path().join("absent.out"),
        &pipeline,
        &EditConfig::default(),
        &mut events,
    );
    assert!(result.is_err());
}

#[test]
fn test_select_paths_standalone() {
    let record = json!({"http": {"status": 503, "path": "/a"}, "retries": [1, 2]});
    assert_eq!(select_paths(&record, "http.status>=500").unwrap(), vec!["http.status"]);
    assert_eq!(select_paths(&record, "retries.?").unwrap(), vec!["retries.0", "retries.1"]);
}

#[test]
fn test_expand_paths_globs_and_dedups() {
    let dir = tempdir().unwrap();
    for name in ["b.log", "a.log", "notes.txt"] {
        fs::write(dir.path().join(name), "{}\n").unwrap();
    }
    let pattern = dir.path().join("*.log");
    let literal = dir.path().join("a.log");
    let pending = dir.path().join("out").join("new.json");

    let expanded = expand_paths(&[pattern, literal.clone(), pending.clone()]).unwrap();
    assert_eq!(
        expanded,
        vec![literal, dir.path().join("b.log"), pending]
    );
}

#[test]
fn test_globbed_scripts_load_in_name_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("2-sort.cmd"), "--array_sort\nids\n").unwrap();
    fs::write(dir.path().join("1-strip.cmd"), "-ks\ntoken\n").unwrap();

    let mut specs = Vec::new();
    for script in expand_paths(&[dir.path().join("*.cmd")]).unwrap() {
        specs.extend(load_script(&script).unwrap());
    }
    assert_eq!(
        specs,
        vec![
            CommandSpec::new(CommandKind::KeyStrip, "token"),
            CommandSpec::new(CommandKind::ArraySort, "ids"),
        ]
    );
}
