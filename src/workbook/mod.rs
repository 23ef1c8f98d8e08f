pub mod cell;

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Reader, Sheets};
use thiserror::Error;
use tracing::debug;

use crate::roster::CellValue;

pub use cell::convert_cell;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("failed reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load workbook: {0}")]
    Open(#[source] calamine::Error),
    #[error("workbook has no sheets")]
    NoSheets,
    #[error("sheet '{name}' not found (available: {})", .available.join(", "))]
    UnknownSheet { name: String, available: Vec<String> },
    #[error("failed to read sheet '{sheet}': {source}")]
    Read {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}

/// One worksheet split into its first row and everything below it.
///
/// Cells keep their sheet coordinates: column `n` of every row is sheet
/// column `n`, and `rows[i]` is sheet row `i + 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub header: Vec<CellValue>,
    pub rows: Vec<Vec<CellValue>>,
}

pub struct Workbook {
    sheets: Sheets<Cursor<Vec<u8>>>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        let bytes = std::fs::read(path).map_err(|source| WorkbookError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WorkbookError> {
        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(WorkbookError::Open)?;
        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    pub fn sheet(&mut self, name: Option<&str>) -> Result<SheetData, WorkbookError> {
        let available = self.sheet_names();
        let name = match name {
            Some(wanted) => available
                .iter()
                .find(|candidate| candidate.as_str() == wanted)
                .cloned()
                .ok_or_else(|| WorkbookError::UnknownSheet {
                    name: wanted.to_string(),
                    available: available.clone(),
                })?,
            None => available.first().cloned().ok_or(WorkbookError::NoSheets)?,
        };

        let range = self
            .sheets
            .worksheet_range(&name)
            .map_err(|source| WorkbookError::Read {
                sheet: name.clone(),
                source,
            })?;

        // calamine ranges start at the first used cell; pad back to sheet coordinates
        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        let lead = vec![CellValue::Empty; first_col as usize];
        let mut grid: Vec<Vec<CellValue>> = (0..first_row).map(|_| Vec::new()).collect();
        grid.extend(range.rows().map(|row| {
            let mut cells = lead.clone();
            cells.extend(row.iter().map(convert_cell));
            cells
        }));

        let mut grid = grid.into_iter();
        let header = grid.next().unwrap_or_default();
        let rows: Vec<Vec<CellValue>> = grid.collect();
        debug!("sheet '{name}': {} header cells, {} data rows", header.len(), rows.len());

        Ok(SheetData { name, header, rows })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook as XlsxWorkbook};

    use crate::roster::CellValue;
    use crate::workbook::{Workbook, WorkbookError};

    fn roster_xlsx() -> XlsxWorkbook {
        let mut book = XlsxWorkbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let sheet = book.add_worksheet();
        sheet.set_name("Delegation Log").expect("sheet name");
        for (col, title) in ["Beginn (Datum)", "Ende (Datum)", "Beteiligte", "Funktion"]
            .into_iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, title).expect("header cell");
        }
        let start = ExcelDateTime::from_ymd(2024, 3, 1).expect("date");
        sheet
            .write_datetime_with_format(1, 0, &start, &date_format)
            .expect("start date");
        sheet.write_string(1, 2, "A. Müller").expect("participant");
        sheet.write_string(1, 3, "Study Nurse").expect("function");
        sheet.write_string(2, 0, "2023-05-01").expect("text date");
        let end = ExcelDateTime::from_ymd(2024, 2, 15).expect("date");
        sheet
            .write_datetime_with_format(2, 1, &end, &date_format)
            .expect("end date");
        sheet.write_string(2, 2, "B. Schmidt").expect("participant");
        sheet.write_number(2, 3, 4.0).expect("function");

        let notes = book.add_worksheet();
        notes.set_name("Notes").expect("sheet name");
        notes.write_string(3, 2, "free text").expect("note");
        book
    }

    fn roster_bytes() -> Vec<u8> {
        roster_xlsx().save_to_buffer().expect("xlsx buffer")
    }

    #[test]
    fn lists_sheets_in_workbook_order() {
        let book = Workbook::from_bytes(roster_bytes()).expect("workbook loads");
        assert_eq!(book.sheet_names(), vec!["Delegation Log", "Notes"]);
    }

    #[test]
    fn first_sheet_is_the_default_and_dates_are_structured() {
        let mut book = Workbook::from_bytes(roster_bytes()).expect("workbook loads");
        let sheet = book.sheet(None).expect("first sheet");
        assert_eq!(sheet.name, "Delegation Log");
        assert_eq!(sheet.header[0], CellValue::text("Beginn (Datum)"));
        assert_eq!(sheet.rows.len(), 2);

        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid test date");
        assert_eq!(sheet.rows[0][0], CellValue::DateTime(expected));
        assert_eq!(sheet.rows[0][1], CellValue::Empty);
        assert_eq!(sheet.rows[1][0], CellValue::text("2023-05-01"));
        assert_eq!(sheet.rows[1][3], CellValue::Number(4.0));
    }

    #[test]
    fn sparse_sheets_keep_sheet_coordinates() {
        let mut book = Workbook::from_bytes(roster_bytes()).expect("workbook loads");
        let sheet = book.sheet(Some("Notes")).expect("notes sheet");
        assert!(sheet.header.is_empty());
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[2][2], CellValue::text("free text"));
        assert_eq!(sheet.rows[2][0], CellValue::Empty);
    }

    #[test]
    fn unknown_sheet_names_the_alternatives() {
        let mut book = Workbook::from_bytes(roster_bytes()).expect("workbook loads");
        let err = book.sheet(Some("Team")).expect_err("no such sheet");
        assert!(matches!(err, WorkbookError::UnknownSheet { .. }));
        assert_eq!(
            err.to_string(),
            "sheet 'Team' not found (available: Delegation Log, Notes)"
        );
    }

    #[test]
    fn opens_workbooks_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roster.xlsx");
        roster_xlsx().save(&path).expect("xlsx saved");
        let mut book = Workbook::open(&path).expect("workbook loads");
        assert_eq!(book.sheet(None).expect("first sheet").rows.len(), 2);
    }

    #[test]
    fn rejects_files_that_are_not_workbooks() {
        let err = Workbook::from_bytes(b"Beginn;Ende\n".to_vec())
            .err()
            .expect("csv bytes are not a workbook");
        assert!(matches!(err, WorkbookError::Open(_)));

        let dir = tempfile::tempdir().expect("tempdir");
        let err = Workbook::open(&dir.path().join("missing.xlsx"))
            .err()
            .expect("missing file");
        assert!(matches!(err, WorkbookError::Io { .. }));
    }
}
