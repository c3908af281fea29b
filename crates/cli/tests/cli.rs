// ABOUTME: CLI integration tests running the docpress binary end to end.

use assert_cmd::Command;
use predicates::prelude::*;

fn docpress() -> Command {
    Command::cargo_bin("docpress").unwrap()
}

#[test]
fn converts_stdin_to_blocks() {
    docpress()
        .arg("-")
        .write_stdin("<h2>Section</h2><p>Hello</p><img src=\"a.jpg\" alt=\"\" />")
        .assert()
        .success()
        .stdout(predicate::str::contains("<!-- wp:heading -->"))
        .stdout(predicate::str::contains("<p>Hello</p>"));
}

#[test]
fn missing_input_file_fails_with_report_error() {
    docpress()
        .arg("does-not-exist.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.html"));
}

#[test]
fn json_envelope_contains_report() {
    docpress()
        .arg("-")
        .arg("--json")
        .write_stdin("<h2>S</h2><p>x</p><img src=\"a.jpg\" />")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"report\""))
        .stdout(predicate::str::contains("\"policiesTriggered\""));
}

#[test]
fn config_output_format_json_emits_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, r#"{"outputFormat": "json"}"#).unwrap();

    docpress()
        .arg("-")
        .arg("--config")
        .arg(&config_path)
        .write_stdin("<h2>S</h2><p>x</p><img src=\"a.jpg\" />")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"report\""))
        .stdout(predicate::str::contains("\"policiesTriggered\""));
}

#[test]
fn strict_mode_fails_on_policy_violation() {
    // No <h2>, requireH2 defaults to minCount 1.
    docpress()
        .arg("-")
        .arg("--strict")
        .write_stdin("<p>no heading</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requireH2"));
}

#[test]
fn relaxed_mode_succeeds_on_policy_violation() {
    docpress()
        .arg("-")
        .write_stdin("<p>no heading</p>")
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>no heading</p>"));
}

#[test]
fn config_file_controls_policies() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        r#"{"policies": {"requireH2": false, "minImageCount": false}}"#,
    )
    .unwrap();

    docpress()
        .arg("-")
        .arg("--strict")
        .arg("--config")
        .arg(&config_path)
        .write_stdin("<p>no heading</p>")
        .assert()
        .success();
}

#[test]
fn bad_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, "{broken").unwrap();

    docpress()
        .arg("-")
        .arg("--config")
        .arg(&config_path)
        .write_stdin("<p>x</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[test]
fn output_and_report_files_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.html");
    let output = dir.path().join("out.txt");
    let report = dir.path().join("report.json");
    std::fs::write(&input, "<h2>S</h2><p>x</p><img src=\"a.jpg\" />").unwrap();

    docpress()
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let markup = std::fs::read_to_string(&output).unwrap();
    assert!(markup.contains("<!-- wp:heading -->"));

    let report_json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report_json["success"], true);
    assert!(report_json["inputFile"]
        .as_str()
        .unwrap()
        .ends_with("in.html"));
}

#[test]
fn timing_flag_prints_to_stderr() {
    docpress()
        .arg("-")
        .arg("--timing")
        .write_stdin("<h2>S</h2><p>x</p><img src=\"a.jpg\" />")
        .assert()
        .success()
        .stderr(predicate::str::contains("ms"));
}
