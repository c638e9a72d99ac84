// CLI integration tests for `folderloc resolve` against the fake repository service.
mod common;

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use common::{FakeRepository, TestResult};
use serde_json::Value;

fn cmd(home: &Path) -> Command {
    let exe = env!("CARGO_BIN_EXE_folderloc");
    let mut command = Command::new(exe);
    command
        .env("HOME", home)
        .env_remove("FOLDERLOC_BASE_URL")
        .env_remove("FOLDERLOC_TOKEN")
        .env_remove("RUST_LOG");
    command
}

fn run_with_stdin(mut command: Command, input: &str) -> TestResult<Output> {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .ok_or("missing stdin")?
        .write_all(input.as_bytes())?;
    Ok(child.wait_with_output()?)
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

fn stderr_json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).expect("stderr json"))
        .collect()
}

#[test]
fn resolves_ids_from_arguments() -> TestResult<()> {
    let home = tempfile::tempdir()?;
    let server = FakeRepository::with_examples().start()?;
    let output = cmd(home.path())
        .args([
            "--base-url",
            server.base_url.as_str(),
            "resolve",
            "--label",
            "UserGuides=UserGuides",
            "GUID-1",
            "GUID-2",
        ])
        .output()?;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        stdout_lines(&output),
        vec!["\\General\\Folder1\\Folder2", "\\UserGuides"]
    );
    Ok(())
}

#[test]
fn json_output_carries_logical_id() -> TestResult<()> {
    let home = tempfile::tempdir()?;
    let server = FakeRepository::with_examples().start()?;
    let output = cmd(home.path())
        .args([
            "--base-url",
            server.base_url.as_str(),
            "resolve",
            "--json",
            "--separator",
            "/",
            "GUID-1",
        ])
        .output()?;
    assert!(output.status.success());
    let line: Value = serde_json::from_str(&stdout_lines(&output)[0])?;
    assert_eq!(line["logical_id"], "GUID-1");
    assert_eq!(line["path"], "/General/Folder1/Folder2");
    Ok(())
}

#[test]
fn reads_profile_from_config_file() -> TestResult<()> {
    let home = tempfile::tempdir()?;
    let server = FakeRepository::with_examples().start()?;
    let config = home.path().join("profile.json");
    std::fs::write(
        &config,
        format!(
            r#"{{"ws_base_url": "{}", "token": "t0k", "base_folder_labels": {{"Data": "Algemeen"}}}}"#,
            server.base_url
        ),
    )?;
    let output = cmd(home.path())
        .args(["--config", config.to_str().ok_or("utf8 path")?, "resolve", "GUID-1"])
        .output()?;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_lines(&output), vec!["\\Algemeen\\Folder1\\Folder2"]);
    assert_eq!(server.auth_headers(), vec![Some("Bearer t0k".to_string())]);
    Ok(())
}

#[test]
fn empty_id_is_invalid_input_without_lookup() -> TestResult<()> {
    let home = tempfile::tempdir()?;
    let server = FakeRepository::with_examples().start()?;
    let output = cmd(home.path())
        .args(["--base-url", server.base_url.as_str(), "resolve", "GUID-1", ""])
        .output()?;
    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
    let errors = stderr_json_lines(&output);
    assert_eq!(errors[0]["error"]["kind"], "InvalidInput");
    assert_eq!(errors[0]["error"]["index"], 1);
    assert_eq!(server.calls(), 0);
    Ok(())
}

#[test]
fn fail_fast_prints_no_paths() -> TestResult<()> {
    let home = tempfile::tempdir()?;
    let server = FakeRepository::with_examples().start()?;
    let output = cmd(home.path())
        .args([
            "--base-url",
            server.base_url.as_str(),
            "resolve",
            "GUID-1",
            "GUID-MISSING",
            "GUID-2",
        ])
        .output()?;
    assert_eq!(output.status.code(), Some(4));
    assert!(output.stdout.is_empty());
    let errors = stderr_json_lines(&output);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["error"]["kind"], "RemoteLookup");
    assert_eq!(errors[0]["error"]["logical_id"], "GUID-MISSING");
    assert_eq!(errors[0]["error"]["status"], 404);
    assert_eq!(server.seen(), vec!["GUID-1", "GUID-MISSING"]);
    Ok(())
}

#[test]
fn keep_going_reads_stdin_and_reports_each_failure() -> TestResult<()> {
    let home = tempfile::tempdir()?;
    let server = FakeRepository::with_examples()
        .location("GUID-X", "Archive", &[])
        .start()?;
    let mut command = cmd(home.path());
    command.args([
        "--base-url",
        server.base_url.as_str(),
        "resolve",
        "--keep-going",
        "--jobs",
        "2",
    ]);
    let input = "GUID-1\n{\"ishRef\":\"GUID-MISSING\",\"lngRef\":4}\n\n\"GUID-X\"\nGUID-1\n";
    let output = run_with_stdin(command, input)?;

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(
        stdout_lines(&output),
        vec!["\\General\\Folder1\\Folder2", "\\General\\Folder1\\Folder2"]
    );
    let kinds = stderr_json_lines(&output)
        .iter()
        .map(|value| value["error"]["kind"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    assert_eq!(kinds, vec!["RemoteLookup", "UnmappedCategory"]);
    assert_eq!(server.calls(), 4);
    Ok(())
}

#[test]
fn missing_base_url_is_usage_error() -> TestResult<()> {
    let home = tempfile::tempdir()?;
    let output = cmd(home.path()).args(["resolve", "GUID-1"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    let errors = stderr_json_lines(&output);
    assert_eq!(errors[0]["error"]["kind"], "Usage");
    Ok(())
}

#[test]
fn no_ids_is_usage_error() -> TestResult<()> {
    let home = tempfile::tempdir()?;
    let output = cmd(home.path())
        .args(["--base-url", "http://127.0.0.1:9/", "resolve"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    let errors = stderr_json_lines(&output);
    assert_eq!(errors[0]["error"]["message"], "no logical ids given");
    Ok(())
}

#[test]
fn completion_script_is_generated() -> TestResult<()> {
    let home = tempfile::tempdir()?;
    let output = cmd(home.path()).args(["completion", "bash"]).output()?;
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("folderloc"));
    Ok(())
}
