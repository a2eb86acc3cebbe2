use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn run_validate(input: &str, args: &[&str]) -> Value {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("bit.json");
    fs::write(&input_path, input).unwrap();

    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.arg("validate").arg(input_path.as_os_str()).args(args);
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn too_many_titles_warns_once() {
    let input = r#"[
        {"type": "title", "value": "a"},
        {"type": "title", "value": "b"},
        {"type": "title", "value": "c"}
    ]"#;
    let result = run_validate(input, &["--bit", "article"]);

    assert_eq!(result["bitType"], "article");
    assert_eq!(result["content"].as_array().unwrap().len(), 3);
    let warnings = result["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["kind"], "tooMany");
    assert_eq!(warnings[0]["max"], 2);
}

#[test]
fn body_and_footer_are_checked() {
    let input = r#"{"content": [], "body": "some body", "footer": "a footer"}"#;
    let result = run_validate(input, &["--bit", "image"]);

    let kinds: Vec<_> = result["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["bodyNotAllowed", "footerNotAllowed"]);
}

#[test]
fn clean_content_has_no_warnings() {
    let input = r#"[{"type": "title", "value": "only"}]"#;
    let result = run_validate(input, &["--bit", "page"]);

    assert_eq!(result["bitType"], "page");
    assert!(result["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn malformed_input_fails() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("bit.json");
    fs::write(&input_path, "{not json").unwrap();

    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.arg("validate")
        .arg(input_path.as_os_str())
        .args(["--bit", "article"]);
    cmd.assert().failure();
}
