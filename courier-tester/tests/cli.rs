use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "courier-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_courier-tester");
    let output_path = temp_path("json");
    let status = Command::new(exe)
        .args([
            "--tier",
            "easy",
            "--policy",
            "greedy",
            "--seeds",
            "1",
            "--iterations",
            "2",
            "--max-ticks",
            "300",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    let runs = report["runs"].as_array().expect("runs array");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["difficulty"], "easy");
    assert_eq!(runs[1]["seed"], 2);
    assert_eq!(report["aggregates"][0]["runs"], 2);
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_writes_markdown_for_every_tier() {
    let exe = env!("CARGO_BIN_EXE_courier-tester");
    let output_path = temp_path("md");
    let output = Command::new(exe)
        .args([
            "--policy",
            "wanderer",
            "--seeds",
            "5",
            "--max-ticks",
            "40",
            "--report",
            "markdown",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Doomsday Courier Automated Tester"));
    let content = std::fs::read_to_string(&output_path).expect("read output");
    for tier in ["easy", "medium", "hard"] {
        assert!(content.contains(&format!("| {tier} | Wanderer | 1 |")));
    }
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_rejects_bad_seed_tokens() {
    let exe = env!("CARGO_BIN_EXE_courier-tester");
    let output = Command::new(exe)
        .args(["--seeds", "banana", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}
