use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

struct CliRun {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

fn unique_test_dir() -> PathBuf {
    let stamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(value) => value.as_nanos(),
        Err(_) => 0,
    };
    let sequence = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "riskledger-cli-test-{}-{stamp}-{sequence}",
        std::process::id()
    ));
    let created = fs::create_dir_all(&path);
    assert!(created.is_ok());
    path
}

fn write_source_file(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    let written = fs::write(&path, body);
    assert!(written.is_ok());
    path.display().to_string()
}

fn run_cli(args: &[&str], input: Option<&str>) -> CliRun {
    let mut command = Command::new(env!("CARGO_BIN_EXE_riskledger"));
    command.args(args);
    command.env_remove("RUST_LOG");
    if input.is_some() {
        command.stdin(Stdio::piped());
    } else {
        command.stdin(Stdio::null());
    }
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let spawned = command.spawn();
    assert!(spawned.is_ok());
    if let Ok(mut child) = spawned {
        if let Some(body) = input
            && let Some(mut pipe) = child.stdin.take()
        {
            let written = pipe.write_all(body.as_bytes());
            assert!(written.is_ok());
        }

        let output = child.wait_with_output();
        assert!(output.is_ok());
        if let Ok(result) = output {
            return CliRun {
                code: result.status.code(),
                stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            };
        }
    }

    CliRun {
        code: None,
        stdout: String::new(),
        stderr: String::new(),
    }
}

fn parse_json(body: &str) -> Value {
    let parsed = serde_json::from_str::<Value>(body);
    assert!(parsed.is_ok());
    parsed.unwrap_or(Value::Null)
}

/// Nineteen 10:00 card payments of 1000 and one 1900 payment at 03:00.
fn outlier_csv() -> String {
    let mut body = String::from("Date,Description,Amount\n");
    for minute in 0..19 {
        body.push_str(&format!(
            "15/01/2024 10:{minute:02},Card payment {minute},-1000.00\n"
        ));
    }
    body.push_str("17/01/2024 03:00,Late night purchase,-1900.00\n");
    body
}

#[test]
fn root_command_prints_short_help() {
    let run = run_cli(&[], None);
    assert_eq!(run.code, Some(0));
    assert!(run.stdout.starts_with("riskledger - transaction batch anomaly scoring"));
    assert!(run.stdout.contains("riskledger columns <path>"));
}

#[test]
fn help_and_version_succeed() {
    let help = run_cli(&["--help"], None);
    assert_eq!(help.code, Some(0));
    assert!(help.stdout.contains("Score a bank or card export:"));

    let analyze_help = run_cli(&["analyze", "--help"], None);
    assert_eq!(analyze_help.code, Some(0));
    assert!(analyze_help.stdout.contains("Column Detection:"));
    assert!(analyze_help.stdout.contains("+40"));

    let version = run_cli(&["--version"], None);
    assert_eq!(version.code, Some(0));
    assert!(version.stdout.starts_with("riskledger "));
}

#[test]
fn analyze_json_reports_scored_outlier() {
    let dir = unique_test_dir();
    let path = write_source_file(&dir, "statement.csv", &outlier_csv());

    let run = run_cli(&["analyze", path.as_str(), "--json"], None);
    assert_eq!(run.code, Some(0));
    let payload = parse_json(&run.stdout);
    assert_eq!(payload["ok"], Value::Bool(true));
    assert_eq!(payload["command"], "analyze");
    assert_eq!(payload["data"]["policyVersion"], "risk/v1");
    assert_eq!(payload["data"]["summary"]["rowsRetained"], 20);
    assert_eq!(payload["data"]["summary"]["riskDistribution"]["Medium"], 1);
    assert_eq!(payload["data"]["summary"]["riskDistribution"]["Normal"], 19);

    let transactions = payload["data"]["transactions"].as_array().cloned();
    assert!(transactions.is_some());
    if let Some(rows) = transactions {
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[19]["anomalyScore"], 55);
        assert_eq!(rows[19]["riskLevel"], "Medium");
        assert_eq!(rows[0]["riskLevel"], "Normal");
    }
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn analyze_text_lists_findings() {
    let dir = unique_test_dir();
    let path = write_source_file(&dir, "statement.csv", &outlier_csv());

    let run = run_cli(&["analyze", path.as_str()], None);
    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("Summary:"));
    assert!(run.stdout.contains("High 0  Medium 1  Normal 19"));
    assert!(run.stdout.contains("Findings (1):"));
    assert!(run.stdout.contains("Late night purchase"));
    assert!(!run.stdout.contains("Card payment 3"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn stdin_dash_reads_piped_json() {
    let body = r#"[
        {"date": "2024-03-01", "amount": "-12.50", "merchant": "Coffee"},
        {"date": "2024-03-02", "amount": "2500", "merchant": "Payroll"}
    ]"#;

    let run = run_cli(&["columns", "-", "--json"], Some(body));
    assert_eq!(run.code, Some(0));
    let payload = parse_json(&run.stdout);
    assert_eq!(payload["data"]["sourceUsed"], "stdin");
    assert_eq!(payload["data"]["rowsRead"], 2);
    assert_eq!(payload["data"]["columns"]["mapping"]["date"], "date");
    assert_eq!(payload["data"]["columns"]["mapping"]["amount"], "amount");
}

#[test]
fn missing_columns_return_structured_json_failure() {
    let dir = unique_test_dir();
    let path = write_source_file(&dir, "notes.csv", "Memo,Reference\nLunch,A1\n");

    let run = run_cli(&["analyze", path.as_str(), "--json"], None);
    assert_eq!(run.code, Some(1));
    let payload = parse_json(&run.stdout);
    assert_eq!(payload["ok"], Value::Bool(false));
    assert_eq!(payload["error"]["code"], "missing_required_columns");
    assert!(payload["error"]["recovery_steps"].is_array());
    assert_eq!(payload["data"]["missing"][0], "date");
    assert_eq!(payload["data"]["detectedHeaders"][0], "Memo");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_columns_text_failure_names_headers() {
    let dir = unique_test_dir();
    let path = write_source_file(&dir, "notes.csv", "Memo,Reference\nLunch,A1\n");

    let run = run_cli(&["columns", path.as_str()], None);
    assert_eq!(run.code, Some(1));
    assert!(run.stdout.contains("Something went wrong, but it's easy to fix."));
    assert!(run.stdout.contains("  Error:    missing_required_columns"));
    assert!(run.stdout.contains("  Headers:  Memo, Reference"));
    assert!(run.stdout.contains("What to do next:"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn no_input_source_is_a_user_error() {
    let run = run_cli(&["analyze", "--json"], None);
    assert_eq!(run.code, Some(1));
    let payload = parse_json(&run.stdout);
    assert_eq!(payload["error"]["code"], "invalid_argument");
}

#[test]
fn parse_errors_honor_json_flag() {
    let run = run_cli(&["analyze", "a.csv", "b.csv", "--json"], None);
    assert_eq!(run.code, Some(1));
    let payload = parse_json(&run.stdout);
    assert_eq!(payload["error"]["code"], "invalid_argument");
    assert_eq!(payload["data"]["command_hint"], "analyze");
    let message = payload["error"]["message"].as_str().unwrap_or_default();
    assert!(!message.contains("Usage:"));
}

#[test]
fn verbose_logs_go_to_stderr_only() {
    let dir = unique_test_dir();
    let path = write_source_file(&dir, "statement.csv", &outlier_csv());

    let run = run_cli(&["analyze", path.as_str(), "--json", "--verbose"], None);
    assert_eq!(run.code, Some(0));
    assert_eq!(parse_json(&run.stdout)["ok"], Value::Bool(true));
    assert!(!run.stderr.is_empty());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn success_output_pipe_close_does_not_panic() {
    let dir = unique_test_dir();
    let path = write_source_file(&dir, "statement.csv", &outlier_csv());

    let mut producer = Command::new(env!("CARGO_BIN_EXE_riskledger"));
    producer.args(["analyze", path.as_str(), "--json"]);
    producer.stdin(Stdio::null());
    producer.stdout(Stdio::piped());
    producer.stderr(Stdio::piped());

    let spawned = producer.spawn();
    assert!(spawned.is_ok());
    if let Ok(mut child) = spawned {
        if let Some(stdout_pipe) = child.stdout.take() {
            let mut reader = BufReader::new(stdout_pipe);
            let mut first_line = String::new();
            let read = reader.read_line(&mut first_line);
            assert!(read.is_ok());
            assert!(!first_line.is_empty());
            drop(reader);
        }

        let status = child.wait();
        assert!(status.is_ok());

        if let Some(mut stderr_pipe) = child.stderr.take() {
            let mut stderr = String::new();
            let read = stderr_pipe.read_to_string(&mut stderr);
            assert!(read.is_ok());
            assert!(!stderr.contains("panicked"));
            assert!(!stderr.contains("failed printing to stdout"));
        }
    }
    let _ = fs::remove_dir_all(&dir);
}
