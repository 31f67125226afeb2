// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: In-memory workbook model addressed by column name; filtering, dedup, column removal, autosizing
// role: model/sheet
// inputs: Header lists, FlatRecords and Cells from the report builders
// outputs: Workbook { sheets, active } ready for xlsx serialization
// invariants:
// - Every row has exactly headers.len() cells
// - Sheet names are unique (case-insensitive), free of []:*?/\ and at most 31 chars
// - Exactly one sheet is active; set_active forces every sheet visible
// - Column letters are only produced at the formula/serialization boundary (cell_ref)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use crate::flatten::{FieldValue, FlatRecord};
use crate::util::column_letter;

pub const MAX_SHEET_NAME_CHARS: usize = 31;
pub const MAX_COLUMN_WIDTH: f64 = 255.0;
const ILLEGAL_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
  #[default]
  Empty,
  Text(String),
  Number(f64),
  Link {
    url: String,
    text: String,
  },
  Formula {
    text: String,
    cached: String,
    styled_link: bool,
  },
}

impl Cell {
  /// What a reader sees: link text for links, the cached result for formulas.
  pub fn display(&self) -> String {
    match self {
      Cell::Empty => String::new(),
      Cell::Text(s) => s.clone(),
      Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
      Cell::Number(n) => n.to_string(),
      Cell::Link { text, .. } => text.clone(),
      Cell::Formula { cached, .. } => cached.clone(),
    }
  }

  pub fn is_formula(&self) -> bool {
    matches!(self, Cell::Formula { .. })
  }
}

impl From<&FieldValue> for Cell {
  fn from(v: &FieldValue) -> Self {
    match v {
      FieldValue::Null => Cell::Empty,
      FieldValue::Text(s) => Cell::Text(s.clone()),
      FieldValue::Int(n) => Cell::Number(*n as f64),
    }
  }
}

impl From<&str> for Cell {
  fn from(v: &str) -> Self {
    Cell::Text(v.to_string())
  }
}

impl From<String> for Cell {
  fn from(v: String) -> Self {
    Cell::Text(v)
  }
}

/// Borrowed view of one row with by-name access.
pub struct RowView<'a> {
  headers: &'a [String],
  cells: &'a [Cell],
}

impl<'a> RowView<'a> {
  pub fn get(&self, name: &str) -> Option<&'a Cell> {
    self.headers.iter().position(|h| h == name).map(|i| &self.cells[i])
  }

  pub fn text(&self, name: &str) -> String {
    self.get(name).map(Cell::display).unwrap_or_default()
  }

  pub fn cells(&self) -> &'a [Cell] {
    self.cells
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
  pub name: String,
  pub headers: Vec<String>,
  pub rows: Vec<Vec<Cell>>,
  pub visible: bool,
  pub widths: Vec<Option<f64>>,
}

impl Sheet {
  fn new(name: String, headers: Vec<String>) -> Self {
    let widths = vec![None; headers.len()];

    Self {
      name,
      headers,
      rows: Vec::new(),
      visible: true,
      widths,
    }
  }

  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == name)
  }

  /// Append a row, padding with Empty or dropping surplus cells to fit the header.
  pub fn push_row(&mut self, mut cells: Vec<Cell>) {
    cells.resize(self.headers.len(), Cell::Empty);
    self.rows.push(cells);
  }

  /// Append a record; header columns the record lacks stay Empty.
  pub fn push_record(&mut self, record: &FlatRecord) {
    let cells = self
      .headers
      .iter()
      .map(|h| record.get(h).map(Cell::from).unwrap_or_default())
      .collect();

    self.push_row(cells);
  }

  #[cfg(test)]
  pub fn row(&self, row: usize) -> Option<RowView<'_>> {
    self.rows.get(row).map(|cells| RowView {
      headers: &self.headers,
      cells,
    })
  }

  pub fn row_views(&self) -> impl Iterator<Item = RowView<'_>> {
    self.rows.iter().map(|cells| RowView {
      headers: &self.headers,
      cells,
    })
  }

  pub fn value(&self, row: usize, name: &str) -> Option<&Cell> {
    let col = self.column_index(name)?;
    self.rows.get(row).map(|cells| &cells[col])
  }

  pub fn text(&self, row: usize, name: &str) -> String {
    self.value(row, name).map(Cell::display).unwrap_or_default()
  }

  /// Returns false when the row or column does not exist.
  pub fn set_cell(&mut self, row: usize, name: &str, cell: Cell) -> bool {
    let Some(col) = self.column_index(name) else {
      return false;
    };

    match self.rows.get_mut(row) {
      Some(cells) => {
        cells[col] = cell;
        true
      }
      None => false,
    }
  }

  /// Spreadsheet reference of a data cell; data row 0 sits under the header on sheet row 2.
  pub fn cell_ref(&self, row: usize, name: &str) -> Option<String> {
    self
      .column_index(name)
      .map(|col| format!("{}{}", column_letter(col), row + 2))
  }

  /// Keep the first row for each distinct display value of `name`. Returns rows removed.
  pub fn dedup_by(&mut self, name: &str) -> usize {
    let Some(col) = self.column_index(name) else {
      return 0;
    };

    let before = self.rows.len();
    let mut seen = HashSet::new();
    self.rows.retain(|cells| seen.insert(cells[col].display()));

    before - self.rows.len()
  }

  pub fn retain_rows<F>(&mut self, mut keep: F)
  where
    F: FnMut(&RowView<'_>) -> bool,
  {
    let headers = &self.headers;

    self.rows.retain(|cells| keep(&RowView { headers, cells }));
  }

  pub fn remove_column(&mut self, name: &str) -> bool {
    let Some(col) = self.column_index(name) else {
      return false;
    };

    self.headers.remove(col);
    self.widths.remove(col);

    for cells in &mut self.rows {
      cells.remove(col);
    }

    true
  }

  /// Width = (longest displayed value incl. header + 2) * 1.2, capped at the format limit.
  pub fn autosize_columns(&mut self) {
    for (col, header) in self.headers.iter().enumerate() {
      let longest = self
        .rows
        .iter()
        .map(|cells| cells[col].display().chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0);

      let width = ((longest + 2) as f64 * 1.2).min(MAX_COLUMN_WIDTH);
      self.widths[col] = Some(width);
    }
  }
}

/// Replace characters the xlsx format rejects and clip to 31 chars.
pub fn sanitize_sheet_name(raw: &str) -> String {
  let replaced: String = raw
    .chars()
    .map(|c| if ILLEGAL_SHEET_CHARS.contains(&c) { '_' } else { c })
    .collect();

  let trimmed = replaced.trim_matches('\'');
  let base = if trimmed.trim().is_empty() { "Sheet" } else { trimmed };

  base.chars().take(MAX_SHEET_NAME_CHARS).collect()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
  pub sheets: Vec<Sheet>,
  pub active: usize,
}

impl Workbook {
  pub fn new() -> Self {
    Self::default()
  }

  fn name_taken(&self, name: &str) -> bool {
    self.sheets.iter().any(|s| s.name.to_lowercase() == name.to_lowercase())
  }

  fn unique_name(&self, raw: &str) -> String {
    let base = sanitize_sheet_name(raw);

    if !self.name_taken(&base) {
      return base;
    }

    let mut n = 2;

    loop {
      let suffix = format!(" ({})", n);
      let keep = MAX_SHEET_NAME_CHARS - suffix.chars().count();
      let candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);

      if !self.name_taken(&candidate) {
        return candidate;
      }

      n += 1;
    }
  }

  /// Append a sheet; the stored name may differ from `name` (see `sanitize_sheet_name`).
  pub fn add_sheet<S: AsRef<str>>(&mut self, name: &str, headers: &[S]) -> &mut Sheet {
    let unique = self.unique_name(name);
    let headers = headers.iter().map(|h| h.as_ref().to_string()).collect();

    self.sheets.push(Sheet::new(unique, headers));
    let idx = self.sheets.len() - 1;

    &mut self.sheets[idx]
  }

  pub fn sheet(&self, name: &str) -> Option<&Sheet> {
    self.sheets.iter().find(|s| s.name == name)
  }

  #[cfg(test)]
  pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
    self.sheets.iter_mut().find(|s| s.name == name)
  }

  pub fn sheet_names(&self) -> Vec<String> {
    self.sheets.iter().map(|s| s.name.clone()).collect()
  }

  pub fn total_rows(&self) -> usize {
    self.sheets.iter().map(|s| s.rows.len()).sum()
  }

  /// Make `name` the single active sheet and force every sheet visible.
  pub fn set_active(&mut self, name: &str) -> bool {
    let Some(idx) = self.sheets.iter().position(|s| s.name == name) else {
      return false;
    };

    self.active = idx;

    for sheet in &mut self.sheets {
      sheet.visible = true;
    }

    true
  }

  #[cfg(test)]
  pub fn active_name(&self) -> Option<&str> {
    self.sheets.get(self.active).map(|s| s.name.as_str())
  }
}
