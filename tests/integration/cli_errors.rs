use predicates::prelude::*;
use test_support::{cmd_bin, tempdir, write_token, BIN};

#[test]
fn errors_without_subcommand() {
  cmd_bin(BIN)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Provide a subcommand"));
}

#[test]
fn errors_when_token_file_missing() {
  let td = tempdir();
  let missing = td.path().join("nope.txt");

  cmd_bin(BIN)
    .args(["pull-requests", "--token-file", missing.to_str().unwrap()])
    .args(["--out-dir", td.path().to_str().unwrap()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("reading token file"));
}

#[test]
fn errors_on_duplicate_project_numbers() {
  let td = tempdir();
  let token = write_token(td.path());

  cmd_bin(BIN)
    .args(["project-status", "--project", "12=A", "--project", "12=B"])
    .args(["--token-file", token.to_str().unwrap()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("duplicate --project number 12"));
}

#[test]
fn errors_on_malformed_now_override() {
  let td = tempdir();
  let token = write_token(td.path());

  cmd_bin(BIN)
    .args(["pull-requests", "--now-override", "yesterday"])
    .args(["--token-file", token.to_str().unwrap()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid --now-override"));
}
