//! Pull-request export: one row per PR, number hyperlinked to the PR page.

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::PullRequestsConfig;
use crate::flatten::{col, flatten_issue, flatten_pull_request, FlatRecord};
use crate::github::paging::fetch_rest_all;
use crate::report::{ReportOutput, RunContext};
use crate::sheet::{Cell, Workbook};
use crate::xlsx::save_workbook;

pub const HEADERS: [&str; 10] = [
  col::NUMBER,
  col::TYPE,
  col::TITLE,
  col::BODY,
  col::REPORTER,
  col::LABELS,
  col::MILESTONE,
  col::STATE,
  col::REVIEWERS,
  col::COMMITTERS,
];

pub const FILE_PREFIX: &str = "Pull_requests_";

/// Add a sheet of flattened PR/issue records; the Number cell links to the item's page.
pub fn add_item_sheet(book: &mut Workbook, name: &str, records: &[FlatRecord]) {
  let sheet = book.add_sheet(name, &HEADERS);

  for (row, record) in records.iter().enumerate() {
    sheet.push_record(record);

    let url = record.text(col::URL);
    if !url.is_empty() {
      sheet.set_cell(
        row,
        col::NUMBER,
        Cell::Link {
          url,
          text: record.text(col::NUMBER),
        },
      );
    }
  }

  sheet.autosize_columns();
}

fn fetch(ctx: &RunContext<'_>, owner: &str, repo: &str, resource: &str) -> Vec<Value> {
  let base = ctx.repo_url(owner, repo, resource);
  let outcome = fetch_rest_all(ctx.api, &base);

  if outcome.items.is_empty() {
    warn!(resource, pages = outcome.pages, "no data fetched, please check the fetch logic");
  } else {
    info!(resource, items = outcome.items.len(), pages = outcome.pages, "data fetched");
  }

  outcome.items
}

pub fn build(cfg: &PullRequestsConfig, ctx: &RunContext<'_>) -> Workbook {
  let mut book = Workbook::new();

  let pulls: Vec<FlatRecord> = fetch(ctx, &cfg.owner, &cfg.repo, "pulls")
    .iter()
    .map(flatten_pull_request)
    .collect();
  add_item_sheet(&mut book, &format!("Pull R. for {}", cfg.repo), &pulls);

  if cfg.include_issues {
    let issues: Vec<FlatRecord> = fetch(ctx, &cfg.owner, &cfg.repo, "issues")
      .iter()
      .map(flatten_issue)
      .collect();
    add_item_sheet(&mut book, &format!("Issues for {}", cfg.repo), &issues);
  }

  if let Some(first) = book.sheet_names().first() {
    book.set_active(first);
  }

  book
}

pub fn run(cfg: &PullRequestsConfig, ctx: &RunContext<'_>) -> Result<ReportOutput> {
  let book = build(cfg, ctx);
  let path = ctx.output_path(FILE_PREFIX, "xlsx");

  save_workbook(&book, &path)?;
  info!(path = %path.display(), rows = book.total_rows(), "pull requests written");

  Ok(ReportOutput::describe(&path, &book))
}
