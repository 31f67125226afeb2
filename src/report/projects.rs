// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Project-status workbook: one sheet per project board with derived label columns and a link formula
// role: report/projects
// inputs: ProjectsConfig (org + NUMBER=TITLE list); RunContext
// outputs: Workbook with one sheet per project, first sheet active; ProjectsStatus_<ts>.xlsx
// side_effects: One GraphQL POST per page per project; writes the workbook
// invariants:
// - Projects are fetched sequentially in config order; an aborted project keeps the rows fetched before the abort
// - Derived formulas reference the labels/URL cells of their own row only
// - POD Project holds the sheet's (possibly truncated) name
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::{ProjectSpec, ProjectsConfig};
use crate::derived::{self, render_formula, Derived, HYPERLINK_FORMULA};
use crate::flatten::{col, flatten_project_item, FlatRecord};
use crate::github::paging::fetch_project_items;
use crate::report::{ReportOutput, RunContext};
use crate::sheet::{Cell, Sheet, Workbook};
use crate::xlsx::save_workbook;

pub const LABEL_STATUS: &str = "LabelStatus";
pub const LABEL_ISSUE_TYPE: &str = "LabelIssueType";
pub const POD: &str = "Pod";
pub const IS_DEFECT: &str = "IsDefect";
pub const GITHUB_LINK: &str = "GitHub Link";
pub const POD_PROJECT: &str = "POD Project";

pub const HEADERS: [&str; 15] = [
  col::TITLE,
  col::URL,
  col::CREATED_AT,
  col::UPDATED_AT,
  col::STATE,
  col::AUTHOR,
  col::LABELS,
  LABEL_STATUS,
  LABEL_ISSUE_TYPE,
  POD,
  IS_DEFECT,
  col::MILESTONE,
  GITHUB_LINK,
  POD_PROJECT,
  col::STATUS,
];

pub const FILE_PREFIX: &str = "ProjectsStatus_";

/// Formula cell for `derived` bound to `row`, cached with the in-process result.
pub fn derived_cell(sheet: &Sheet, row: usize, derived: Derived) -> Option<Cell> {
  let labels_ref = sheet.cell_ref(row, col::LABELS)?;
  let url_ref = sheet.cell_ref(row, col::URL)?;
  let labels = sheet.text(row, col::LABELS);

  Some(Cell::Formula {
    text: render_formula(derived.template, &labels_ref, &url_ref),
    cached: (derived.eval)(&labels),
    styled_link: false,
  })
}

/// HYPERLINK formula over the row's URL cell, styled as a link.
pub fn link_cell(sheet: &Sheet, row: usize) -> Option<Cell> {
  let url_ref = sheet.cell_ref(row, col::URL)?;
  let labels_ref = sheet.cell_ref(row, col::LABELS).unwrap_or_default();

  Some(Cell::Formula {
    text: render_formula(HYPERLINK_FORMULA, &labels_ref, &url_ref),
    cached: derived::link_text(&sheet.text(row, col::URL)),
    styled_link: true,
  })
}

/// (Re)write the derived `columns` and the link column for every row at its current position.
pub fn apply_derived(sheet: &mut Sheet, columns: &[(&str, Derived)], link_column: Option<&str>) {
  for row in 0..sheet.rows.len() {
    for (name, derived) in columns {
      if let Some(cell) = derived_cell(sheet, row, *derived) {
        sheet.set_cell(row, name, cell);
      }
    }

    if let Some(name) = link_column {
      if let Some(cell) = link_cell(sheet, row) {
        sheet.set_cell(row, name, cell);
      }
    }
  }
}

pub fn project_columns() -> [(&'static str, Derived); 4] {
  [
    (LABEL_STATUS, derived::LABEL_STATUS),
    (LABEL_ISSUE_TYPE, derived::ISSUE_TYPE),
    (POD, derived::POD),
    (IS_DEFECT, derived::IS_DEFECT),
  ]
}

/// Fetch and flatten every configured project, in order.
pub fn fetch_projects(cfg: &ProjectsConfig, ctx: &RunContext<'_>) -> Vec<(ProjectSpec, Vec<FlatRecord>)> {
  let graphql_url = ctx.graphql_url();

  cfg
    .projects
    .iter()
    .map(|project| {
      let outcome = fetch_project_items(ctx.api, &graphql_url, &cfg.org, project.number);
      let records: Vec<FlatRecord> = outcome.items.iter().filter_map(flatten_project_item).collect();

      if let Some(err) = &outcome.aborted {
        warn!(project = project.number, error = %err, kept = records.len(), "project fetch incomplete");
      }

      info!(
        project = project.number,
        title = %project.title,
        pages = outcome.pages,
        items = records.len(),
        "project fetched"
      );

      (project.clone(), records)
    })
    .collect()
}

/// One sheet per project; first sheet active.
pub fn build_workbook(projects: &[(ProjectSpec, Vec<FlatRecord>)]) -> Workbook {
  let mut book = Workbook::new();

  for (project, records) in projects {
    let sheet = book.add_sheet(&project.title, &HEADERS);
    let sheet_name = sheet.name.clone();

    for (row, record) in records.iter().enumerate() {
      sheet.push_record(record);
      sheet.set_cell(row, POD_PROJECT, Cell::Text(sheet_name.clone()));
    }

    apply_derived(sheet, &project_columns(), Some(GITHUB_LINK));
    sheet.autosize_columns();
  }

  if let Some(first) = book.sheet_names().first() {
    book.set_active(first);
  }

  book
}

pub fn run(cfg: &ProjectsConfig, ctx: &RunContext<'_>) -> Result<ReportOutput> {
  let fetched = fetch_projects(cfg, ctx);
  let book = build_workbook(&fetched);
  let path = ctx.output_path(FILE_PREFIX, "xlsx");

  save_workbook(&book, &path)?;
  info!(path = %path.display(), sheets = book.sheets.len(), "project status written");

  Ok(ReportOutput::describe(&path, &book))
}
