mod common;

use std::time::Duration;

use common::MathWalkProcess;
use mathwalk::config::{ConfigLoader, LoaderOptions};
use mathwalk::effect::Cue;
use mathwalk::error::ConfigError;
use mathwalk::phase::Phase;
use mathwalk::problem::ProblemKind;
use mathwalk::session::{SessionController, SessionStatus};

fn loader(strict: bool) -> ConfigLoader {
    ConfigLoader::new(LoaderOptions {
        strict,
        ..LoaderOptions::default()
    })
}

#[test]
fn fixture_loads_into_a_session() {
    let result = loader(true)
        .load(&MathWalkProcess::fixture_path("halves-and-thirds.yaml"))
        .unwrap();
    assert!(result.warnings.is_empty());
    assert_eq!(result.config.problem.kind, ProblemKind::FractionAdd);
    assert_eq!(result.config.playback.tick_period, Duration::from_millis(1));

    let session = SessionController::new(
        result.config.session_config().unwrap(),
        mathwalk::effect::SessionHooks::new(),
    )
    .unwrap();
    assert_eq!(session.status(), SessionStatus::Running);
    assert_eq!(session.tick_period(), Duration::from_millis(1));
}

#[test]
fn undefined_problem_warns_then_fails_strict() {
    let path = MathWalkProcess::fixture_path("divide-by-zero.yaml");

    let relaxed = loader(false).load(&path).unwrap();
    assert_eq!(relaxed.warnings.len(), 1);
    assert!(relaxed.warnings[0].message.contains("divide by zero"));

    match loader(true).load(&path) {
        Err(ConfigError::ValidationError { errors, .. }) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].path, "problem");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn zero_pacing_is_rejected() {
    let err = loader(false)
        .load(&MathWalkProcess::fixture_path("zero-pacing.yaml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

#[test]
fn unknown_fields_are_parse_errors() {
    let err = loader(false)
        .load(&MathWalkProcess::fixture_path("unknown-field.yaml"))
        .unwrap_err();
    match err {
        ConfigError::ParseError { message, .. } => assert!(message.contains("speed")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn syntax_error_and_empty_file() {
    assert!(matches!(
        loader(false).load(&MathWalkProcess::fixture_path("bad-yaml.yaml")),
        Err(ConfigError::ParseError { .. })
    ));
    match loader(false).load(&MathWalkProcess::fixture_path("empty.yaml")) {
        Err(ConfigError::ParseError { message, .. }) => assert!(message.contains("empty")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_file() {
    let err = loader(false)
        .load(std::path::Path::new("/nonexistent/mathwalk/walk.yaml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingFile { .. }));
}

#[test]
fn misspelled_flag_is_a_warning_with_suggestion() {
    let result = loader(false)
        .load(&MathWalkProcess::fixture_path("misspelled-flag.yaml"))
        .unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].message.contains("show_roots"));
    assert_eq!(
        result.warnings[0].location.as_deref(),
        Some("problem.flags.show_root")
    );
}

#[test]
fn defaults_fill_in_from_environment_syntax() {
    // Neither variable is set, so both defaults apply.
    let result = loader(true)
        .load(&MathWalkProcess::fixture_path("env-tick.yaml"))
        .unwrap();
    assert_eq!(result.config.problem.params.operands, vec![13.0, 4.0]);
    assert_eq!(result.config.playback.tick_period, Duration::from_millis(1));
}

#[test]
fn oversized_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.yaml");
    let mut body = String::from("problem:\n  kind: limit\n  operands: [2]\n");
    body.push_str(&"# padding\n".repeat(200_000));
    std::fs::write(&path, body).unwrap();

    let err = loader(false).load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "file_size"));
}

#[test]
fn cue_overrides_reach_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cues.yaml");
    std::fs::write(
        &path,
        "problem:\n  kind: division\n  operands: [13, 4]\ncues:\n  remainder: chime\n  distribute: ~\n",
    )
    .unwrap();

    let result = loader(true).load(&path).unwrap();
    let session = result.config.session_config().unwrap();
    assert_eq!(session.cues.cue_for(Phase::Remainder), Some(Cue::Chime));
    assert_eq!(session.cues.cue_for(Phase::Distribute), None);
    assert_eq!(session.cues.cue_for(Phase::Complete), Some(Cue::Success));
}

#[test]
fn bom_prefixed_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bom.yaml");
    std::fs::write(
        &path,
        "\u{feff}problem:\n  kind: place-value\n  operands: [3045]\n",
    )
    .unwrap();
    let result = loader(true).load(&path).unwrap();
    assert_eq!(result.config.problem.kind, ProblemKind::PlaceValue);
}
