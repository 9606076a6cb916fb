// src/load/mod.rs
use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;
use tracing::debug;

use crate::error::FileError;

pub mod timestamp;

/// One loaded sheet. Column 0 is the date, column 1 the time, everything
/// after that is a candidate data series. Headers are what the file claims;
/// resolution to display names happens later.
#[derive(Debug)]
pub struct SheetTable {
    pub headers: Vec<String>,
    /// Data rows, header excluded. Dense and rectangular: every row has one
    /// cell per header, absent cells are `Data::Empty`.
    pub rows: Vec<Vec<Data>>,
}

impl SheetTable {
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

/// Read the first sheet of `path` into a `SheetTable`.
///
/// Rows whose every cell is empty are dropped here; logger exports often
/// carry trailing blank rows and they must not fail the timestamp pass.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn load_sheet(path: &Path) -> Result<SheetTable, FileError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or(FileError::NoSheet)??;

    let (_, width) = range.get_size();
    if width < 3 {
        return Err(FileError::InputShape { found: width });
    }

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.as_string().unwrap_or_default())
            .collect(),
        None => return Err(FileError::EmptySeries),
    };

    let mut rows: Vec<Vec<Data>> = Vec::new();
    let mut dropped = 0usize;
    for row in rows_iter {
        if row.iter().all(|cell| cell.is_empty()) {
            dropped += 1;
            continue;
        }
        rows.push(row.to_vec());
    }
    if dropped > 0 {
        debug!(dropped, "dropped blank rows");
    }

    if rows.is_empty() {
        return Err(FileError::EmptySeries);
    }

    Ok(SheetTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, headers: &[&str], rows: &[&[&str]]) -> Result<std::path::PathBuf> {
        let path = dir.path().join(name);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header)?;
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Ok(num) = cell.parse::<f64>() {
                    sheet.write_number((r + 1) as u32, c as u16, num)?;
                } else if !cell.is_empty() {
                    sheet.write_string((r + 1) as u32, c as u16, *cell)?;
                }
            }
        }
        workbook.save(&path)?;
        Ok(path)
    }

    #[test]
    fn loads_headers_and_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_fixture(
            &dir,
            "basic.xlsx",
            &["Datum", "Uhrzeit", "pH", "°C"],
            &[
                &["22.12.2025", "00:00:00", "7.1", "4.5"],
                &["22.12.2025", "00:15:00", "7.2", "4.6"],
            ],
        )?;

        let table = load_sheet(&path)?;
        assert_eq!(table.headers, vec!["Datum", "Uhrzeit", "pH", "°C"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.width(), 4);
        Ok(())
    }

    #[test]
    fn rejects_narrow_sheet() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_fixture(
            &dir,
            "narrow.xlsx",
            &["Datum", "Uhrzeit"],
            &[&["22.12.2025", "00:00:00"]],
        )?;

        match load_sheet(&path) {
            Err(FileError::InputShape { found: 2 }) => Ok(()),
            other => panic!("expected InputShape, got {:?}", other.map(|t| t.headers)),
        }
    }

    #[test]
    fn rejects_sheet_without_data_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_fixture(&dir, "empty.xlsx", &["Datum", "Uhrzeit", "pH"], &[])?;

        assert!(matches!(load_sheet(&path), Err(FileError::EmptySeries)));
        Ok(())
    }

    #[test]
    fn drops_blank_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_fixture(
            &dir,
            "blanks.xlsx",
            &["Datum", "Uhrzeit", "pH"],
            &[
                &["22.12.2025", "00:00:00", "7.1"],
                &["", "", ""],
                &["22.12.2025", "00:30:00", "7.3"],
            ],
        )?;

        let table = load_sheet(&path)?;
        assert_eq!(table.rows.len(), 2);
        Ok(())
    }
}
