use anyhow::Result;
use std::fs;
use std::process::Command;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_convo-segmenter"))
}

const LOG: &str = r#"[
    {"role": "user", "content": "q1", "timestamp": "2024-01-01T08:00:00"},
    {"role": "assistant", "content": "a1", "timestamp": "2024-01-01T08:01:00"},
    {"role": "user", "content": "q2", "timestamp": "2024-01-01T11:00:00"},
    {"role": "assistant", "content": "a2", "timestamp": "2024-01-01T11:30:00"}
]"#;

/// `convert` without `--output` streams JSON lines to stdout.
#[test]
fn convert_writes_jsonl_to_stdout() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("chat.json");
    fs::write(&input, LOG)?;

    let out = bin().arg("convert").arg("--input").arg(&input).output()?;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0])?;
    assert_eq!(first["messages"][0]["content"], "q1");
    assert_eq!(first["messages"][1]["role"], "assistant");
    Ok(())
}

/// A tight threshold passed on the command line overrides the 2 hour default.
#[test]
fn convert_honours_threshold_flag() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("chat.json");
    let output = dir.path().join("chat.jsonl");
    fs::write(&input, LOG)?;

    let status = bin()
        .args(["convert", "--threshold-hours", "0.25", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .status()?;
    assert!(status.success());

    // q2 -> a2 is a 30 minute gap, over the 15 minute threshold.
    let written = fs::read_to_string(&output)?;
    assert_eq!(written.lines().count(), 1);
    Ok(())
}

/// `--separator` replaces ". " between merged same-role messages.
#[test]
fn convert_honours_separator_flag() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("chat.json");
    fs::write(
        &input,
        r#"[
        {"role": "user", "content": "first", "timestamp": "2024-01-01T08:00:00"},
        {"role": "user", "content": "second", "timestamp": "2024-01-01T08:00:30"},
        {"role": "assistant", "content": "reply", "timestamp": "2024-01-01T08:01:00"}
    ]"#,
    )?;

    let out = bin()
        .args(["convert", "--separator", " | ", "--input"])
        .arg(&input)
        .output()?;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout)?;
    let value: serde_json::Value = serde_json::from_str(stdout.trim_end())?;
    assert_eq!(value["messages"][0]["content"], "first | second");
    assert_eq!(value["messages"][1]["content"], "reply");
    Ok(())
}

/// A failed `convert --output` removes what an earlier run wrote there.
#[test]
fn convert_failure_removes_existing_output() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("chat.json");
    let output = dir.path().join("chat.jsonl");
    fs::write(&input, r#"[{"role": "user", "content": "q1"}]"#)?;
    fs::write(&output, "{\"messages\":[]}\n")?;

    let out = bin()
        .arg("convert")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .output()?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("timestamp"));
    assert!(!output.exists());
    Ok(())
}

/// Batch mode reports each file and fails when any file is invalid.
#[test]
fn batch_reports_failures_with_nonzero_exit() -> Result<()> {
    let root = tempfile::tempdir()?;
    let input_dir = root.path().join("in");
    let output_dir = root.path().join("out");
    fs::create_dir(&input_dir)?;
    fs::write(input_dir.join("ok.json"), LOG)?;
    fs::write(input_dir.join("bad.json"), r#"[{"role": "user"}]"#)?;

    let out = bin()
        .arg("batch")
        .arg("--input-dir")
        .arg(&input_dir)
        .arg("--output-dir")
        .arg(&output_dir)
        .output()?;
    assert!(!out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stdout.contains("Processed: ok.json"), "stdout: {stdout}");
    assert!(stderr.contains("Failed: bad.json"), "stderr: {stderr}");
    assert!(output_dir.join("new-ok.json").exists());
    assert!(!output_dir.join("new-bad.json").exists());
    Ok(())
}

/// `batch --json` prints a machine-readable report instead of progress lines.
#[test]
fn batch_json_report_lists_outcomes() -> Result<()> {
    let root = tempfile::tempdir()?;
    let input_dir = root.path().join("in");
    let output_dir = root.path().join("out");
    fs::create_dir(&input_dir)?;
    fs::write(input_dir.join("chat.json"), LOG)?;

    let out = bin()
        .arg("batch")
        .arg("--json")
        .arg("--input-dir")
        .arg(&input_dir)
        .arg("--output-dir")
        .arg(&output_dir)
        .output()?;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    let outcomes = report["outcomes"].as_array().expect("outcomes array");
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0]["status"], "processed");
    assert_eq!(outcomes[0]["stats"]["messages_in"], 4);
    assert_eq!(outcomes[0]["stats"]["transcripts"], 2);
    let written = outcomes[0]["output"].as_str().expect("output path");
    assert!(written.ends_with("new-chat.json"));
    assert!(output_dir.join("new-chat.json").exists());
    Ok(())
}

/// `config` prints defaults merged with file values and flag overrides.
#[test]
fn config_prints_effective_toml() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg_path = dir.path().join("segmenter.toml");
    fs::write(&cfg_path, "output_prefix = \"train-\"\n")?;

    let out = bin()
        .arg("config")
        .arg("--config")
        .arg(&cfg_path)
        .args(["--threshold-hours", "1"])
        .output()?;
    assert!(out.status.success());

    let text = String::from_utf8(out.stdout)?;
    let value: toml::Value = toml::from_str(&text)?;
    assert_eq!(value["output_prefix"].as_str(), Some("train-"));
    assert_eq!(value["segmenter"]["threshold_seconds"].as_integer(), Some(3600));
    assert_eq!(value["segmenter"]["separator"].as_str(), Some(". "));
    Ok(())
}
