use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn bits_lists_types_and_aliases() {
    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.arg("bits");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("article\n"))
        .stdout(predicate::str::contains("page (alias of article)\n"))
        .stdout(predicate::str::contains("recipe\n"));
}

#[test]
fn info_prints_resolved_config() {
    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.args(["info", "recipe"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "inherits: _standard > cookIngredients > recipe",
        ))
        .stdout(predicate::str::contains("[Tags]"))
        .stdout(predicate::str::contains("servings"));
}

#[test]
fn info_accepts_aliases() {
    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.args(["info", "page"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[Bit]"));
}

#[test]
fn info_rejects_unknown_bit_type() {
    let mut cmd = cargo_bin_cmd!("bitmark");
    cmd.args(["info", "noSuchBit"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown bit type 'noSuchBit'"));
}
