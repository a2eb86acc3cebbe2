use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn breakscape_reads_stdin() {
    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.arg("breakscape").write_stdin("a**b");
    cmd.assert().success().stdout("a*^*b");
}

#[test]
fn breakscape_in_tag_location() {
    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.args(["breakscape", "--location", "tag"]).write_stdin("a]b");
    cmd.assert().success().stdout("a^]b");
}

#[test]
fn plain_text_keeps_inline_markup() {
    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.args(["breakscape", "--format", "text"])
        .write_stdin("a **b** ^");
    cmd.assert().success().stdout("a **b** ^");
}

#[test]
fn unbreakscape_reads_file() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("escaped.txt");
    fs::write(&input_path, "[^.article]\n#^ title\n").unwrap();

    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.arg("unbreakscape").arg(input_path.as_os_str());
    cmd.assert().success().stdout("[.article]\n# title\n");
}

#[test]
fn location_comes_from_config_and_flag_wins() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("bitmark.toml");
    fs::write(
        &config_path,
        r#"[breakscape]
location = "tag"
"#,
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.arg("breakscape")
        .arg("--config")
        .arg(config_path.as_os_str())
        .write_stdin("a]b");
    cmd.assert().success().stdout("a^]b");

    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.arg("breakscape")
        .arg("--config")
        .arg(config_path.as_os_str())
        .args(["--location", "body"])
        .write_stdin("a]b");
    cmd.assert().success().stdout("a]b");
}

#[test]
fn missing_config_file_fails() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("absent.toml");

    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.arg("breakscape")
        .arg("--config")
        .arg(config_path.as_os_str())
        .write_stdin("x");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
