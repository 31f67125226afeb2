//! Markdown release notes built from the Features and Defects sheets.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::flatten::col;
use crate::github::issue_body::{fetch_issue_body, NO_DESCRIPTION};
use crate::report::release::DerivedSheets;
use crate::report::RunContext;
use crate::sheet::{RowView, Workbook};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureNote {
  pub title: String,
  pub body: String,
  pub url: String,
}

/// ` - `-joined non-empty values of a defect row; formula cells are skipped.
pub fn defect_line(row: &RowView<'_>) -> String {
  row
    .cells()
    .iter()
    .filter(|c| !c.is_formula())
    .map(|c| c.display())
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" - ")
}

pub fn render_release_notes(features: &[FeatureNote], defects: &[String]) -> String {
  let mut out = String::from("# Release Notes\n\n");

  for f in features {
    let body = if f.body.trim().is_empty() { NO_DESCRIPTION } else { f.body.as_str() };

    out.push_str(&format!("## **{}**\n\n", f.title));
    out.push_str(&format!("*{}*\n\n", body));
    out.push_str(&format!("[Issue Link]({})\n\n", f.url));
  }

  out.push_str("## **List of Defects**\n\n");
  for line in defects {
    out.push_str(&format!("* {}\n", line));
  }

  if !defects.is_empty() {
    out.push('\n');
  }

  out
}

/// Re-fetch each feature's description, render the notes, write them to `path`.
pub fn write_release_notes(
  ctx: &RunContext<'_>,
  owner: &str,
  repo: &str,
  book: &Workbook,
  sheets: &DerivedSheets,
  path: &Path,
) -> Result<()> {
  let features: Vec<FeatureNote> = book
    .sheet(&sheets.features)
    .map(|sheet| {
      sheet
        .row_views()
        .map(|row| {
          let url = row.text(col::URL);
          FeatureNote {
            title: row.text(col::TITLE),
            body: fetch_issue_body(ctx.api, &ctx.api_base, owner, repo, &url),
            url,
          }
        })
        .collect()
    })
    .unwrap_or_default();

  let defects: Vec<String> = book
    .sheet(&sheets.defects)
    .map(|sheet| sheet.row_views().map(|row| defect_line(&row)).collect())
    .unwrap_or_default();

  let text = render_release_notes(&features, &defects);
  std::fs::write(path, text).with_context(|| format!("writing release notes {}", path.display()))?;

  info!(path = %path.display(), features = features.len(), defects = defects.len(), "release notes written");

  Ok(())
}
