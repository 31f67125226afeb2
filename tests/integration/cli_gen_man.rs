use assert_cmd::Command;

#[test]
fn cli_generates_man_page() {
  let mut cmd = Command::cargo_bin("gh-status-report").unwrap();
  let out = cmd.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let s = String::from_utf8_lossy(&out.stdout);
  // roff escapes hyphens in the body; only the .TH line carries the raw binary name
  assert!(s.contains(".TH"));
  assert!(s.contains("gh-status-report"));
  assert!(s.contains(".SH SUBCOMMANDS"));
  assert!(s.contains("release\\-notes"));
}
