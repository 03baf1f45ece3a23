use std::fs;

use tempfile::tempdir;

use crate::logging::RecordingSink;
use crate::services::slicer::output::OutputInterpreter;
use crate::services::slicer::SliceOutcome;
use crate::types::errors::SliceError;

#[test]
fn test_text_path_extracts_all_fields() {
    let dir = tempdir().unwrap();
    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let stdout = "Slicing plate 1\n\
                  Estimated time: 1h 15m\n\
                  Filament weight: 123.4g\n\
                  Filament length: 41.2m\n";
    let metrics = interpreter.interpret(dir.path(), stdout, "");

    assert_eq!(metrics.estimated_time_minutes, Some(75.0));
    assert_eq!(metrics.estimated_time_formatted.as_deref(), Some("1h 15m"));
    assert_eq!(metrics.filament_weight_grams, Some(123.4));
    assert_eq!(metrics.filament_length_meters, Some(41.2));
    // 123.4 * 0.03 = 3.702, rounded at the record boundary.
    assert_eq!(metrics.estimated_cost_usd, Some(3.7));
    assert!(metrics.warnings.is_empty());
}

#[test]
fn test_text_path_reads_stderr_too() {
    let dir = tempdir().unwrap();
    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let metrics = interpreter.interpret(dir.path(), "", "estimated time: 45m\n");
    assert_eq!(metrics.estimated_time_minutes, Some(45.0));
}

#[test]
fn test_empty_output_yields_absent_fields() {
    let dir = tempdir().unwrap();
    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let metrics = interpreter.interpret(dir.path(), "", "");

    assert_eq!(metrics.estimated_time_minutes, None);
    assert_eq!(metrics.estimated_time_formatted, None);
    assert_eq!(metrics.filament_weight_grams, None);
    assert_eq!(metrics.filament_length_meters, None);
    assert_eq!(metrics.estimated_cost_usd, None);
    assert!(metrics.warnings.is_empty());
}

#[test]
fn test_zero_weight_still_yields_cost() {
    let dir = tempdir().unwrap();
    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let metrics = interpreter.interpret(dir.path(), "filament weight: 0g\n", "");

    // Zero weight is a known value, not absence.
    assert_eq!(metrics.filament_weight_grams, Some(0.0));
    assert_eq!(metrics.estimated_cost_usd, Some(0.0));
}

#[test]
fn test_warnings_collected_in_order_and_capped() {
    let dir = tempdir().unwrap();
    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let stdout = "ok line\n\
                  WARNING: thin wall on layer 3\n\
                  Error: bridge unsupported\n\
                  warning: one\n\
                  warning: two\n\
                  warning: three\n\
                  warning: four\n\
                  warning: five\n";
    let metrics = interpreter.interpret(dir.path(), stdout, "");

    assert_eq!(metrics.warnings.len(), 5);
    assert_eq!(metrics.warnings[0], "WARNING: thin wall on layer 3");
    assert_eq!(metrics.warnings[1], "Error: bridge unsupported");
    assert_eq!(metrics.warnings[4], "warning: three");
}

#[test]
fn test_json_file_takes_priority_and_never_merges_text_warnings() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("result.json"),
        r#"{"estimated_time_minutes": 75.0, "weight_grams": 100.0, "filament_length_meters": 33.5}"#,
    )
    .unwrap();

    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    // Warning-bearing text is available but must be ignored on the JSON path.
    let stdout = "WARNING: thin wall on layer 3\nestimated time: 9h 59m\n";
    let metrics = interpreter.interpret(dir.path(), stdout, "");

    assert_eq!(metrics.estimated_time_minutes, Some(75.0));
    assert_eq!(metrics.filament_weight_grams, Some(100.0));
    assert_eq!(metrics.filament_length_meters, Some(33.5));
    assert_eq!(metrics.estimated_cost_usd, Some(3.0));
    assert!(metrics.warnings.is_empty());
}

#[test]
fn test_json_path_does_not_fall_back_per_field() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("result.json"), r#"{"time_minutes": 30}"#).unwrap();

    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    // Weight is present in the text, but the JSON strategy is terminal.
    let metrics = interpreter.interpret(dir.path(), "filament weight: 55g\n", "");

    assert_eq!(metrics.estimated_time_minutes, Some(30.0));
    assert_eq!(metrics.estimated_time_formatted.as_deref(), Some("30m"));
    assert_eq!(metrics.filament_weight_grams, None);
    assert_eq!(metrics.estimated_cost_usd, None);
}

#[test]
fn test_invalid_json_falls_back_to_text_with_warning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("result.json"), "{not json").unwrap();

    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let metrics = interpreter.interpret(dir.path(), "estimated time: 45m\n", "");

    assert_eq!(metrics.estimated_time_minutes, Some(45.0));
    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Could not parse JSON output"));
}

#[test]
fn test_first_json_file_by_name_is_deterministic() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.json"), r#"{"time_minutes": 10}"#).unwrap();
    fs::write(dir.path().join("a.json"), r#"{"time_minutes": 99}"#).unwrap();

    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let metrics = interpreter.interpret(dir.path(), "", "");
    assert_eq!(metrics.estimated_time_minutes, Some(99.0));
}

#[test]
fn test_nonzero_exit_is_tool_failure_with_full_message() {
    let dir = tempdir().unwrap();
    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let long_stderr = "mesh error ".repeat(50);
    let outcome = SliceOutcome {
        exit_code: 1,
        stdout: "partial output".to_string(),
        stderr: long_stderr.clone(),
    };

    match interpreter.interpret_outcome(&outcome, dir.path()) {
        Err(SliceError::ExternalToolFailure(msg)) => assert_eq!(msg, long_stderr),
        other => panic!("Expected ExternalToolFailure, got {other:?}"),
    }
}

#[test]
fn test_nonzero_exit_uses_stdout_when_stderr_empty() {
    let dir = tempdir().unwrap();
    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let outcome = SliceOutcome {
        exit_code: 2,
        stdout: "died on plate 1".to_string(),
        stderr: String::new(),
    };

    match interpreter.interpret_outcome(&outcome, dir.path()) {
        Err(SliceError::ExternalToolFailure(msg)) => assert_eq!(msg, "died on plate 1"),
        other => panic!("Expected ExternalToolFailure, got {other:?}"),
    }
}

#[test]
fn test_zero_exit_interprets_output() {
    let dir = tempdir().unwrap();
    let sink = RecordingSink::new();
    let interpreter = OutputInterpreter::new(&sink);

    let outcome = SliceOutcome {
        exit_code: 0,
        stdout: "estimated time: 2h\n".to_string(),
        stderr: String::new(),
    };

    let metrics = interpreter.interpret_outcome(&outcome, dir.path()).unwrap();
    assert_eq!(metrics.estimated_time_minutes, Some(120.0));
    assert_eq!(metrics.estimated_time_formatted.as_deref(), Some("2h"));
}
