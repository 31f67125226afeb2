use test_support::fixtures::{graphql_fixture, graphql_page, project_item};
use test_support::{cmd_bin, tempdir, write_token, BIN, ENV_GRAPHQL_PAGES};

fn items(start: u64) -> Vec<serde_json::Value> {
  (start..start + 5)
    .map(|n| project_item(n, &format!("Item {}", n), &["Feature", "Pod: Alpha"], None, Some("Todo")))
    .collect()
}

#[test]
fn pages_through_cursors_for_each_project() {
  let td = tempdir();
  let token = write_token(td.path());

  let fixture = graphql_fixture(vec![
    (
      12,
      vec![
        (None, graphql_page(items(1), Some("c1"), true)),
        (Some("c1"), graphql_page(items(6), Some("c2"), true)),
        (Some("c2"), graphql_page(items(11), None, false)),
      ],
    ),
    (18, vec![(None, graphql_page(items(100), None, false))]),
  ]);

  let out = cmd_bin(BIN)
    .env(ENV_GRAPHQL_PAGES, fixture.to_string())
    .args(["project-status", "--org", "acme"])
    .args(["--project", "12=Workbench Program Status"])
    .args(["--project", "18=Workbench-Platform-Americas-Streams"])
    .args(["--token-file", token.to_str().unwrap()])
    .args(["--out-dir", td.path().to_str().unwrap()])
    .args(["--now-override", "2025-08-15T12:00:00"])
    .output()
    .unwrap();

  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(
    v["sheets"],
    serde_json::json!(["Workbench Program Status", "Workbench-Platform-Americas-Str"])
  );
  assert_eq!(v["rows"], 20);
  assert!(td.path().join("ProjectsStatus_20250815_120000.xlsx").is_file());
}

#[test]
fn graphql_error_is_not_fatal() {
  let td = tempdir();
  let token = write_token(td.path());
  let fixture = serde_json::json!({});

  let out = cmd_bin(BIN)
    .env(ENV_GRAPHQL_PAGES, fixture.to_string())
    .args(["project-status", "--project", "7=Only"])
    .args(["--token-file", token.to_str().unwrap()])
    .args(["--out-dir", td.path().to_str().unwrap()])
    .output()
    .unwrap();

  assert!(out.status.success());
  assert!(String::from_utf8_lossy(&out.stderr).contains("fetch aborted"));
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["rows"], 0);
}
