mod common;

use common::MathWalkProcess;
use serde_json::Value;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// version / completions
// ============================================================================

#[test]
fn version_human() {
    let output = MathWalkProcess::spawn_command(&["version"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("mathwalk"), "{out}");
    assert!(out.contains('.'), "version number expected: {out}");
}

#[test]
fn version_json() {
    let output = MathWalkProcess::spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let parsed: Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(parsed["name"], "mathwalk");
    assert!(parsed["kinds"].as_array().is_some_and(|k| k.len() == 8));
}

#[test]
fn completions_bash() {
    let output = MathWalkProcess::spawn_command(&["completions", "bash"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("mathwalk"));
}

// ============================================================================
// list
// ============================================================================

#[test]
fn list_presets_json() {
    let output = MathWalkProcess::spawn_command(&["list", "presets", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let parsed: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = parsed["presets"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert!(names.contains(&"halves-and-thirds"));
    assert!(parsed.get("kinds").is_none());
}

#[test]
fn list_kinds_filtered() {
    let output = MathWalkProcess::spawn_command(&["list", "kinds", "--kind", "limit"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("limit"));
    assert!(out.contains("side"));
    assert!(!out.contains("factoring"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn validate_good_file() {
    let path = MathWalkProcess::fixture_path("halves-and-thirds.yaml");
    let output = MathWalkProcess::spawn_command(&["validate", path.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains('✓'));
}

#[test]
fn validate_reports_every_file() {
    let good = MathWalkProcess::fixture_path("halves-and-thirds.yaml");
    let bad = MathWalkProcess::fixture_path("zero-pacing.yaml");
    let output = MathWalkProcess::spawn_command(&[
        "validate",
        "--format",
        "json",
        bad.to_str().unwrap(),
        good.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    let parsed: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let report = parsed.as_array().unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0]["valid"], false);
    assert_eq!(report[1]["valid"], true);
}

#[test]
fn validate_strict_rejects_undefined_problem() {
    let path = MathWalkProcess::fixture_path("divide-by-zero.yaml");
    let relaxed = MathWalkProcess::spawn_command(&["validate", path.to_str().unwrap()]);
    assert!(relaxed.status.success(), "{}", stderr(&relaxed));

    let strict =
        MathWalkProcess::spawn_command(&["validate", "--strict", path.to_str().unwrap()]);
    assert_eq!(strict.status.code(), Some(2));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_inline_division_instant() {
    let output = MathWalkProcess::spawn_command(&[
        "run",
        "--kind",
        "division",
        "--operands",
        "13,4",
        "--instant",
        "--mute",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("13 ÷ 4"), "{out}");
    assert!(out.contains("quotient=3"), "{out}");
    assert!(out.contains("remainder=1"), "{out}");
    assert!(!out.contains('♪'), "muted run printed a cue: {out}");
}

#[test]
fn run_preset_json_ends_complete() {
    let output = MathWalkProcess::spawn_command(&[
        "run",
        "--preset",
        "quarters",
        "--instant",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    let frames: Vec<Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is a snapshot"))
        .collect();
    let ticks: Vec<u64> = frames.iter().filter_map(|f| f["tick"].as_u64()).collect();
    assert!(ticks.windows(2).all(|w| w[1] == w[0] + 1), "ticks skip: {ticks:?}");
    let last = frames.last().unwrap();
    assert_eq!(last["phase"], "complete");
    assert_eq!(last["outputs"]["result"]["num"], 3);
    assert_eq!(last["outputs"]["result"]["den"], 4);
}

#[test]
fn run_real_time_with_tick_limit() {
    let output = MathWalkProcess::spawn_command(&[
        "run",
        "--kind",
        "limit",
        "--operands",
        "2",
        "--tick-period",
        "1ms",
        "--max-ticks",
        "5",
        "--quiet",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
}

#[test]
fn run_invalid_problem_exits_4() {
    let output = MathWalkProcess::spawn_command(&[
        "run",
        "--kind",
        "division",
        "--operands",
        "13,0",
    ]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stdout(&output).contains("cannot be animated"));
    assert!(stderr(&output).contains("divide by zero"));
}

#[test]
fn run_writes_event_log() {
    let dir = tempfile::tempdir().unwrap();
    let events = dir.path().join("events.jsonl");
    let output = MathWalkProcess::spawn_command(&[
        "run",
        "--preset",
        "thirteen-by-four",
        "--instant",
        "--quiet",
        "--events-file",
        events.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let log = std::fs::read_to_string(&events).unwrap();
    let types: Vec<String> = log
        .lines()
        .map(|line| {
            let v: Value = serde_json::from_str(line).unwrap();
            v["type"].as_str().unwrap().to_owned()
        })
        .collect();
    assert_eq!(types.first().map(String::as_str), Some("SessionStarted"));
    assert_eq!(types.last().map(String::as_str), Some("SessionStopped"));
    assert_eq!(types.iter().filter(|t| *t == "WalkthroughCompleted").count(), 1);
    assert_eq!(types.iter().filter(|t| *t == "PhaseEntered").count(), 3);
}

#[test]
fn run_unknown_preset_suggests() {
    let output = MathWalkProcess::spawn_command(&["run", "--preset", "quarter"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("did you mean 'quarters'"));
}

#[test]
fn run_without_source_is_usage_error() {
    let output = MathWalkProcess::spawn_command(&["run"]);
    assert!(!output.status.success());
}

#[test]
fn run_rejects_pacing_beyond_limit() {
    let output = MathWalkProcess::spawn_command(&[
        "run",
        "--preset",
        "quarters",
        "--pacing",
        "4000000000",
        "--instant",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("command line"), "{}", stderr(&output));
}
