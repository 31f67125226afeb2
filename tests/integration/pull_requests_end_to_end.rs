use test_support::fixtures::{pull_request, rest_pages};
use test_support::{cmd_bin, files_with_prefix, tempdir, write_token, BIN, ENV_REST_PAGES};

#[test]
fn exports_150_pull_requests_to_timestamped_workbook() {
  let td = tempdir();
  let token = write_token(td.path());
  let out_dir = td.path().join("out");

  let items = (1..=150)
    .map(|n| pull_request(n, &format!("PR {}", n), &["Feature"]))
    .collect();

  let out = cmd_bin(BIN)
    .env(ENV_REST_PAGES, rest_pages(items).to_string())
    .args(["pull-requests", "--owner", "acme", "--repo", "app"])
    .args(["--token-file", token.to_str().unwrap()])
    .args(["--out-dir", out_dir.to_str().unwrap()])
    .args(["--now-override", "2025-08-15T12:00:00"])
    .output()
    .unwrap();

  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["rows"], 150);
  assert_eq!(v["sheets"], serde_json::json!(["Pull R. for app"]));
  assert!(v.get("notes").is_none());

  let written = out_dir.join("Pull_requests_20250815_120000.xlsx");
  assert_eq!(v["workbook"], written.display().to_string());
  let bytes = std::fs::read(&written).unwrap();
  assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn failed_fetch_still_writes_workbook() {
  let td = tempdir();
  let token = write_token(td.path());
  let failing = serde_json::json!([{ "status": 401, "body": "Bad credentials" }]);

  let out = cmd_bin(BIN)
    .env(ENV_REST_PAGES, failing.to_string())
    .args(["pull-requests", "--token-file", token.to_str().unwrap()])
    .args(["--out-dir", td.path().to_str().unwrap()])
    .output()
    .unwrap();

  assert!(out.status.success());
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("no data fetched"));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["rows"], 0);
  assert_eq!(files_with_prefix(td.path(), "Pull_requests_").len(), 1);
}
