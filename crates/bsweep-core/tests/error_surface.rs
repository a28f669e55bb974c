use bsweep_core::errors::{ErrorInfo, SweepError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("executable", "./probe")
        .with_context("size", "4")
}

#[test]
fn launch_error_surface() {
    let err = SweepError::Launch(sample_info("spawn", "no such file"));
    assert_eq!(err.info().code, "spawn");
    assert!(err.info().context.contains_key("executable"));
}

#[test]
fn exit_error_surface() {
    let err = SweepError::Exit(sample_info("exit-status", "exited with status 3"));
    assert_eq!(err.info().code, "exit-status");
    assert_eq!(err.info().context.get("size").map(String::as_str), Some("4"));
}

#[test]
fn config_and_format_shorthands() {
    let err = SweepError::config("step-count", "step count must be positive");
    assert!(matches!(err, SweepError::Config(_)));
    let err = SweepError::format("missing-line", "expected 2 lines");
    assert!(matches!(err, SweepError::Format(_)));
}

#[test]
fn display_includes_context_and_hint() {
    let err = SweepError::Timeout(
        ErrorInfo::new("deadline", "probe exceeded its deadline")
            .with_context("timeout_secs", "2")
            .with_hint("raise invocation.timeout_secs"),
    );
    let rendered = err.to_string();
    assert_eq!(
        rendered,
        "timeout error: probe exceeded its deadline (code: deadline) | context: [timeout_secs=2] | hint: raise invocation.timeout_secs"
    );
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = SweepError::Format(ErrorInfo::new("bad-number", "not a number"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "Format");
    assert_eq!(json["detail"]["code"], "bad-number");
    let decoded: SweepError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, err);
}
