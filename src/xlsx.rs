// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Serialize the in-memory Workbook to an .xlsx file
// role: io/xlsx-writer
// inputs: &Workbook; output path
// outputs: .xlsx file on disk (whole workbook rewritten on every call)
// side_effects: Creates/overwrites the target file; returns only after it is closed
// invariants:
// - Header row is sheet row 1; data row i is sheet row i + 2
// - Text is clipped to the per-cell limit at this boundary
// - Links and link formulas render blue + underlined
// - Exactly one worksheet is marked active; hidden flags follow Sheet::visible
// errors: rust_xlsxwriter errors bubble with the sheet name / path as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatUnderline, Formula, Url, Workbook as XlsxWorkbook, Worksheet};
use tracing::{debug, warn};

use crate::flatten::MAX_CELL_CHARS;
use crate::sheet::{Cell, Sheet, Workbook};
use crate::util::clip_chars;

fn link_format() -> Format {
  Format::new()
    .set_font_color(Color::Blue)
    .set_underline(FormatUnderline::Single)
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, cell: &Cell, link: &Format) -> Result<()> {
  match cell {
    Cell::Empty => {}
    Cell::Text(s) => {
      ws.write_string(row, col, clip_chars(s, MAX_CELL_CHARS))?;
    }
    Cell::Number(n) => {
      ws.write_number(row, col, *n)?;
    }
    Cell::Link { url, text } => {
      let target = Url::new(url.as_str()).set_text(text.as_str());

      // Over-long or malformed targets are kept as plain text.
      if let Err(e) = ws.write_url_with_format(row, col, target, link) {
        warn!(row, col, url = %url, error = %e, "hyperlink rejected; writing text");
        ws.write_string(row, col, clip_chars(text, MAX_CELL_CHARS))?;
      }
    }
    Cell::Formula {
      text,
      cached,
      styled_link,
    } => {
      let formula = Formula::new(text.as_str()).set_result(cached.as_str());

      if *styled_link {
        ws.write_formula_with_format(row, col, formula, link)?;
      } else {
        ws.write_formula(row, col, formula)?;
      }
    }
  }

  Ok(())
}

fn write_sheet(ws: &mut Worksheet, sheet: &Sheet, active: bool, link: &Format) -> Result<()> {
  ws.set_name(sheet.name.as_str())?;

  for (col, header) in sheet.headers.iter().enumerate() {
    ws.write_string(0, col as u16, header.as_str())?;
  }

  for (idx, cells) in sheet.rows.iter().enumerate() {
    let row = idx as u32 + 1;

    for (col, cell) in cells.iter().enumerate() {
      write_cell(ws, row, col as u16, cell, link)?;
    }
  }

  for (col, width) in sheet.widths.iter().enumerate() {
    if let Some(w) = width {
      ws.set_column_width(col as u16, *w)?;
    }
  }

  ws.set_hidden(!sheet.visible && !active);
  ws.set_active(active);

  Ok(())
}

pub fn save_workbook(book: &Workbook, path: &Path) -> Result<()> {
  let mut xlsx = XlsxWorkbook::new();
  let link = link_format();

  if book.sheets.is_empty() {
    // An xlsx file needs at least one worksheet.
    xlsx.add_worksheet();
  }

  for (idx, sheet) in book.sheets.iter().enumerate() {
    let ws = xlsx.add_worksheet();

    write_sheet(ws, sheet, idx == book.active, &link).with_context(|| format!("writing sheet {:?}", sheet.name))?;
  }

  xlsx
    .save(path)
    .with_context(|| format!("saving workbook {}", path.display()))?;

  debug!(path = %path.display(), sheets = book.sheets.len(), "workbook saved");

  Ok(())
}
