use test_support::fixtures::{graphql_fixture, graphql_page, issues, project_item};
use test_support::{cmd_bin, tempdir, write_token, BIN, ENV_GRAPHQL_PAGES, ENV_ISSUES_JSON};

#[test]
fn release_notes_snapshot() {
  test_support::init_tracing();
  let td = tempdir();
  let token = write_token(td.path());

  let nodes = vec![
    project_item(1, "Login page", &["Feature", "Pod: Alpha"], Some("Release 1.7.0"), Some("Done")),
    project_item(2, "Future work", &["Feature"], Some("Release 2.0.0"), None),
    project_item(3, "Crash on save", &["Defect", "Pod: Alpha"], Some("Release 1.7.0"), Some("In Progress")),
  ];
  let graphql = graphql_fixture(vec![(12, vec![(None, graphql_page(nodes, None, false))])]);
  let bodies = issues(&[(
    1,
    "Users can sign in.\r\n\r\nCharge code: X-1\n## Acceptance Criteria\n- works",
  )]);

  let out = cmd_bin(BIN)
    .env(ENV_GRAPHQL_PAGES, graphql.to_string())
    .env(ENV_ISSUES_JSON, bodies.to_string())
    .args(["release-notes", "--project", "12=Board"])
    .args(["--token-file", token.to_str().unwrap()])
    .args(["--out-dir", td.path().to_str().unwrap()])
    .args(["--now-override", "2025-08-15T12:00:00"])
    .output()
    .unwrap();

  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(
    v["sheets"],
    serde_json::json!(["Board", "Release items", "Defects", "Features"])
  );
  assert_eq!(v["rows"], 7);
  assert!(td.path().join("ProjectsStatusReleaseDefects_20250815_120000.xlsx").is_file());

  let notes_path = td.path().join("Release_Notes.md");
  assert_eq!(v["notes"], notes_path.display().to_string());

  let notes = std::fs::read_to_string(&notes_path).unwrap();
  insta::assert_snapshot!(notes, @r###"
# Release Notes

## **Login page**

*Users can sign in.*

[Issue Link](https://github.com/acme/app/issues/1)

## **List of Defects**

* Crash on save - https://github.com/acme/app/issues/3 - 2024-05-01T10:00:00Z - 2024-05-02T10:00:00Z - OPEN - octo - Defect, Pod: Alpha - Defect - Release 1.7.0 - Board - In Progress
"###);
}
