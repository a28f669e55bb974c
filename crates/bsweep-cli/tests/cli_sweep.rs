use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const PROBE: &str = env!("CARGO_BIN_EXE_bsweep-probe");
const BSWEEP: &str = env!("CARGO_BIN_EXE_bsweep");

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("sweep.yaml");
    let text = format!("executable: {PROBE:?}\n{body}");
    fs::write(&path, text).expect("write config");
    path
}

fn bsweep(args: &[&str], config: &Path) -> Output {
    Command::new(BSWEEP)
        .args(args)
        .arg("--config")
        .arg(config)
        .output()
        .expect("run bsweep")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

#[test]
fn single_point_sweep_is_normalized() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config = write_config(dir.path(), "start: 1\nend: 3\nstep_count: 2\nnormalize: true\n");
    let output = bsweep(&["run"], &config);
    assert!(output.status.success(), "bsweep run failed: {output:?}");
    assert_eq!(stdout(&output), "size,setup,run\n4,2.5,5.0\n");
}

#[test]
fn exit_failure_aborts_after_the_header() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config = write_config(
        dir.path(),
        "start: 1\nend: 3\nstep_count: 4\ninvocation:\n  env:\n    BSWEEP_PROBE_EXIT: \"3\"\n",
    );
    let output = bsweep(&["run"], &config);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "size,setup,run\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("exit-status"));
}

#[test]
fn concatenate_mode_forwards_probe_lines() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config = write_config(
        dir.path(),
        "start: 1\nend: 3\nstep_count: 4\nreduction: concatenate\nrepeat: {initial: 2}\ninvocation:\n  env:\n    BSWEEP_PROBE_STYLE: csv\n    BSWEEP_PROBE_RUN: \"117\"\n",
    );
    let output = bsweep(&["run"], &config);
    assert!(output.status.success(), "bsweep run failed: {output:?}");
    assert_eq!(
        stdout(&output),
        "2,117\n2,117\n4,117\n4,117\n5,117\n5,117\n"
    );
}

#[test]
fn arguments_are_truncated_and_crossed_with_the_secondary_range() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config = write_config(
        dir.path(),
        "start: 1\nend: 3\nstep_count: 4\nsecondary: [5, 6]\nsecondary_label: accesses\nreduction: raw\nfields: [size_arg, param_arg]\ninvocation:\n  env:\n    BSWEEP_PROBE_STYLE: echo\n",
    );
    let output = bsweep(&["run"], &config);
    assert!(output.status.success(), "bsweep run failed: {output:?}");
    let text = stdout(&output);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "size,accesses,trial,size_arg,param_arg");
    assert!(lines[1].starts_with("2.828427124746"));
    assert!(lines[1].ends_with(",5,0,2.0,5.0"));
    assert!(lines[2].ends_with(",6,0,2.0,6.0"));
    assert_eq!(lines[3], "4,5,0,4.0,5.0");
    assert_eq!(lines.len(), 7);
}

#[test]
fn out_flag_writes_a_file() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config = write_config(dir.path(), "start: 1\nend: 3\nstep_count: 2\n");
    let table = dir.path().join("table.csv");
    let output = Command::new(BSWEEP)
        .args(["run", "--config"])
        .arg(&config)
        .arg("--out")
        .arg(&table)
        .output()
        .expect("run bsweep");
    assert!(output.status.success(), "bsweep run failed: {output:?}");
    assert!(output.stdout.is_empty());
    assert_eq!(
        fs::read_to_string(&table).expect("table"),
        "size,setup,run\n4,10.0,20.0\n"
    );
}

#[test]
fn plan_is_deterministic_json() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config = write_config(
        dir.path(),
        "start: 1\nend: 5\nstep_count: 4\nrepeat: {initial: 4, floor: 1, decrement: 1}\n",
    );
    let first = bsweep(&["plan"], &config);
    let second = bsweep(&["plan"], &config);
    assert!(first.status.success(), "bsweep plan failed: {first:?}");
    assert_eq!(first.stdout, second.stdout);
    let plan: serde_json::Value = serde_json::from_slice(&first.stdout).expect("plan json");
    assert_eq!(plan["total_trials"], 6);
    assert_eq!(plan["points"][0]["args"][0], "4");
    assert_eq!(plan["points"][2]["repeats"], 1);
    assert_eq!(plan["config_hash"].as_str().map(str::len), Some(64));
}

#[test]
fn invalid_config_exits_without_output() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config = write_config(dir.path(), "start: 3\nend: 1\nstep_count: 2\n");
    let output = bsweep(&["run"], &config);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bounds-order"));
}
