// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dispatch a normalized report config to its pipeline and describe what was written
// role: report/orchestrator
// inputs: &EffectiveConfig; &dyn GithubApi; run timestamp
// outputs: ReportOutput (workbook path, sheet names, data row count, optional notes path)
// side_effects: Creates the output directory; pipelines write files into it
// invariants: Fetch failures never fail the run; only IO/serialization errors propagate
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod notes;
pub mod projects;
pub mod pull_requests;
pub mod release;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::cli::{EffectiveConfig, ReportConfig};
use crate::github::api::GithubApi;
use crate::sheet::Workbook;
use crate::util::{prepare_out_dir, timestamped_file_name};

/// Everything a pipeline needs besides its own config.
pub struct RunContext<'a> {
  pub api: &'a dyn GithubApi,
  pub api_base: String,
  pub out_dir: PathBuf,
  pub now: DateTime<Local>,
}

impl<'a> RunContext<'a> {
  pub fn graphql_url(&self) -> String {
    format!("{}/graphql", self.api_base)
  }

  pub fn repo_url(&self, owner: &str, repo: &str, resource: &str) -> String {
    format!("{}/repos/{}/{}/{}", self.api_base, owner, repo, resource)
  }

  pub fn output_path(&self, prefix: &str, ext: &str) -> PathBuf {
    self.out_dir.join(timestamped_file_name(prefix, ext, self.now))
  }
}

/// Printed to stdout as the run's JSON pointer.
#[derive(Debug, Serialize)]
pub struct ReportOutput {
  pub workbook: String,
  pub sheets: Vec<String>,
  pub rows: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

impl ReportOutput {
  pub fn describe(path: &std::path::Path, book: &Workbook) -> Self {
    Self {
      workbook: path.display().to_string(),
      sheets: book.sheet_names(),
      rows: book.total_rows(),
      notes: None,
    }
  }
}

pub fn run(cfg: &EffectiveConfig, api: &dyn GithubApi, now: DateTime<Local>) -> Result<ReportOutput> {
  let out_dir = prepare_out_dir(std::path::Path::new(&cfg.out_dir))?;

  let ctx = RunContext {
    api,
    api_base: cfg.api_base.trim_end_matches('/').to_string(),
    out_dir,
    now,
  };

  match &cfg.report {
    ReportConfig::PullRequests(c) => pull_requests::run(c, &ctx),
    ReportConfig::ProjectStatus(c) => projects::run(c, &ctx),
    ReportConfig::ReleaseNotes(c) => release::run(c, &ctx),
  }
}
