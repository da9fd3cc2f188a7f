use predicates::prelude::*;

#[test]
fn missing_query_prints_usage_and_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("booknote");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_options() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("booknote");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--no-supplement"));
}

#[test]
fn first_run_writes_default_config_and_keeps_stdout_clean() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let config_path = temp.path().join("config.toml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("booknote");
    cmd.env("NO_COLOR", "1")
        .args(["--config", config_path.to_str().unwrap_or_default(), "Дюна"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Search API key not configured"));

    let written = std::fs::read_to_string(&config_path)?;
    assert!(written.contains("[search]"));
    assert!(written.contains("YOUR_API_KEY_HERE"));
    Ok(())
}
