// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Extension traits over third-party types used when reading GitHub payloads
// role: module/aggregation
// outputs: serde_json::Value path lookups (JsonFetch) for the flattener, paging and issue-body code
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod serde_json;
