// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for GitHub access (transport seam, paging, issue descriptions, fetch errors)
// role: github/namespace
// outputs: Public submodules used by the report pipelines
// invariants: Each submodule isolates network access behind the GithubApi trait
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod error;
pub mod issue_body;
pub mod paging;

#[cfg(test)]
pub mod fake;
