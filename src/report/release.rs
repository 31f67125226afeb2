// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Release-notes pipeline: project-status workbook, then Release items / Defects / Features sheets and the Markdown notes
// role: report/release
// inputs: ReleaseConfig (projects, milestone allow-list, issues repo, notes file); RunContext
// outputs: ProjectsStatusReleaseDefects_<ts>.xlsx (saved before and after post-processing) and the notes file
// side_effects: GraphQL fetches per project; one issue GET per feature; two workbook saves; one notes write
// invariants:
// - Rows are copied from project sheets by column name, never by position
// - Release items = exact milestone match; Defects = labels containing "Defect" (case-sensitive)
// - Both derived sheets keep the first row per URL
// - Every formula left in a derived sheet references its own destination row
// - Features keeps Release items rows whose evaluated issue type contains "feature" (any case)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use tracing::info;

use crate::cli::ReleaseConfig;
use crate::derived::{self, Derived};
use crate::flatten::col;
use crate::report::notes::write_release_notes;
use crate::report::projects::{
  self, apply_derived, build_workbook, fetch_projects, GITHUB_LINK, IS_DEFECT, LABEL_ISSUE_TYPE, LABEL_STATUS, POD,
  POD_PROJECT,
};
use crate::report::{ReportOutput, RunContext};
use crate::sheet::{Cell, Workbook};
use crate::xlsx::save_workbook;

pub const RELEASE_ITEMS: &str = "Release items";
pub const DEFECTS: &str = "Defects";
pub const FEATURES: &str = "Features";

pub const ISSUE_TYPE: &str = "IssueType";
pub const POD_PROJECT_DERIVED: &str = "Pod Project";

pub const FILE_PREFIX: &str = "ProjectsStatusReleaseDefects_";

/// Header of the derived sheets: project headers with IssueType / Pod Project renamed.
pub fn derived_headers() -> Vec<&'static str> {
  projects::HEADERS
    .iter()
    .map(|h| match *h {
      LABEL_ISSUE_TYPE => ISSUE_TYPE,
      POD_PROJECT => POD_PROJECT_DERIVED,
      other => other,
    })
    .collect()
}

fn source_column(derived_header: &str) -> &str {
  match derived_header {
    ISSUE_TYPE => LABEL_ISSUE_TYPE,
    POD_PROJECT_DERIVED => POD_PROJECT,
    other => other,
  }
}

fn release_columns() -> [(&'static str, Derived); 4] {
  [
    (LABEL_STATUS, derived::LABEL_STATUS),
    (ISSUE_TYPE, derived::ISSUE_TYPE),
    (POD, derived::POD),
    (IS_DEFECT, derived::IS_DEFECT),
  ]
}

/// Names the derived sheets actually received; a project sheet may already hold the plain name.
#[derive(Debug, Default, PartialEq)]
pub struct DerivedSheets {
  pub release_items: String,
  pub defects: String,
  pub features: String,
}

#[derive(Debug, Default, PartialEq)]
pub struct PostProcessSummary {
  pub sheets: DerivedSheets,
  pub release_items: usize,
  pub defects: usize,
  pub features: usize,
  pub duplicates_dropped: usize,
}

/// Build the derived sheets from the project sheets already in `book`.
pub fn post_process(book: &mut Workbook, milestones: &[String]) -> PostProcessSummary {
  let headers = derived_headers();
  let project_sheets = book.sheet_names();

  let mut release_rows = Vec::new();
  let mut defect_rows = Vec::new();

  for name in &project_sheets {
    let Some(sheet) = book.sheet(name) else { continue };

    for row in sheet.row_views() {
      let copy = || -> Vec<Cell> {
        headers
          .iter()
          .map(|h| row.get(source_column(h)).cloned().unwrap_or_default())
          .collect()
      };

      if milestones.iter().any(|m| *m == row.text(col::MILESTONE)) {
        release_rows.push(copy());
      }

      if row.text(col::LABELS).contains("Defect") {
        defect_rows.push(copy());
      }
    }
  }

  info!(
    items = release_rows.len(),
    milestones = %milestones.join(", "),
    "collected release items"
  );

  let mut summary = PostProcessSummary::default();

  let release = book.add_sheet(RELEASE_ITEMS, &headers);
  summary.sheets.release_items = release.name.clone();
  for cells in release_rows {
    release.push_row(cells);
  }
  summary.duplicates_dropped += release.dedup_by(col::URL);
  apply_derived(release, &release_columns(), Some(GITHUB_LINK));
  release.autosize_columns();
  summary.release_items = release.rows.len();

  let defects = book.add_sheet(DEFECTS, &headers);
  summary.sheets.defects = defects.name.clone();
  for cells in defect_rows {
    defects.push_row(cells);
  }
  summary.duplicates_dropped += defects.dedup_by(col::URL);
  for column in [LABEL_STATUS, ISSUE_TYPE, POD] {
    defects.remove_column(column);
  }
  for row in 0..defects.rows.len() {
    if defects.text(row, col::LABELS).contains("Defect") {
      defects.set_cell(row, IS_DEFECT, Cell::from("Defect"));
    }
  }
  apply_derived(defects, &[], Some(GITHUB_LINK));
  defects.autosize_columns();
  summary.defects = defects.rows.len();

  let release_rows: Vec<Vec<Cell>> = book
    .sheet(&summary.sheets.release_items)
    .map(|s| s.rows.clone())
    .unwrap_or_default();

  let features = book.add_sheet(FEATURES, &headers);
  summary.sheets.features = features.name.clone();
  for cells in release_rows {
    features.push_row(cells);
  }
  features.retain_rows(|row| row.text(ISSUE_TYPE).to_lowercase().contains("feature"));
  for column in [POD, IS_DEFECT] {
    features.remove_column(column);
  }
  for row in 0..features.rows.len() {
    features.set_cell(row, ISSUE_TYPE, Cell::from("Feature"));
  }
  apply_derived(features, &[(LABEL_STATUS, derived::LABEL_STATUS)], Some(GITHUB_LINK));
  features.autosize_columns();
  summary.features = features.rows.len();

  if let Some(first) = project_sheets.first() {
    book.set_active(first);
  }

  summary
}

pub fn run(cfg: &ReleaseConfig, ctx: &RunContext<'_>) -> Result<ReportOutput> {
  let fetched = fetch_projects(&cfg.projects, ctx);
  let mut book = build_workbook(&fetched);
  let path = ctx.output_path(FILE_PREFIX, "xlsx");

  save_workbook(&book, &path)?;
  info!(path = %path.display(), "project details written including Status");

  let summary = post_process(&mut book, &cfg.milestones);
  save_workbook(&book, &path)?;
  info!(
    path = %path.display(),
    release_items = summary.release_items,
    defects = summary.defects,
    features = summary.features,
    duplicates = summary.duplicates_dropped,
    "release sheets written"
  );

  let notes_path = ctx.out_dir.join(&cfg.notes_file);
  write_release_notes(ctx, &cfg.issues_owner, &cfg.issues_repo, &book, &summary.sheets, &notes_path)?;

  let mut out = ReportOutput::describe(&path, &book);
  out.notes = Some(notes_path.display().to_string());

  Ok(out)
}
