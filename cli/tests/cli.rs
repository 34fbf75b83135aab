use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const PROGRAM: &str = r#"{
    "variables": [{ "id": "v1", "name": "x" }],
    "chains": [{
        "id": "b1", "kind": "variable_set", "fields": { "VAR": "v1" },
        "inputs": { "VALUE": { "id": "b2", "kind": "number", "fields": { "NUM": 42 } } }
    }]
}"#;

fn blockgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blockgen"))
        .args(args)
        .output()
        .expect("failed to run blockgen")
}

fn write_program(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write program file");
    path.to_string_lossy().into_owned()
}

#[test]
fn generate_prints_code() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_program(dir.path(), "program.json", PROGRAM);

    let output = blockgen(&["generate", &path]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "var x = 42;\n");
}

#[test]
fn bare_file_argument_implies_generate() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_program(dir.path(), "program.json", PROGRAM);

    let output = blockgen(&[&path]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "var x = 42;\n");
}

#[test]
fn check_loads_without_generating() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_program(dir.path(), "program.json", PROGRAM);

    let output = blockgen(&["generate", "--check", &path]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn vars_prints_registry_snapshot() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_program(dir.path(), "program.json", PROGRAM);

    let output = blockgen(&["generate", "--quiet", "--vars", &path]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "x = 42\n");
}

#[test]
fn unsupported_block_prints_partial_code_and_fails() {
    let program = r#"{
        "variables": [{ "id": "v1", "name": "x" }],
        "chains": [{
            "id": "b1", "kind": "variable_set", "fields": { "VAR": "v1" },
            "inputs": { "VALUE": { "id": "b2", "kind": "number", "fields": { "NUM": 42 } } },
            "next": { "id": "b3", "kind": "repeat_forever" }
        }]
    }"#;
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_program(dir.path(), "program.json", program);

    let output = blockgen(&["generate", "--no-color", &path]);
    assert!(!output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "var x = 42;\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("b3"), "stderr should name the block: {}", stderr);
    assert!(stderr.contains("repeat_forever"), "stderr: {}", stderr);
}

#[test]
fn malformed_program_reports_load_error() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = write_program(dir.path(), "program.json", "{ \"chains\": [ }");

    let output = blockgen(&["generate", "--no-color", &path]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_runner_passes_and_fails_fixtures() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    let passing = format!(
        r#"{{
            "description": "assignment generates a declaration",
            "program": {},
            "expect_code": "var x = 42;",
            "expect_bindings": {{ "x": "42" }}
        }}"#,
        PROGRAM
    );
    fs::write(dir.path().join("assign.test.json"), passing).unwrap();

    let output = blockgen(&["test", "--no-color", &dir.path().to_string_lossy()]);
    assert!(output.status.success(), "expected fixtures to pass");

    let failing = format!(
        r#"{{
            "description": "deliberately wrong expectation",
            "program": {},
            "expect_code": "var x = 41;"
        }}"#,
        PROGRAM
    );
    fs::write(dir.path().join("wrong.test.json"), failing).unwrap();

    let output = blockgen(&["test", "--no-color", &dir.path().to_string_lossy()]);
    assert!(!output.status.success(), "expected a fixture failure");
}
