//! Workbook loading for the call-log dashboard.
//!
//! Opens `.xlsx` / `.xls` / `.xlsb` / `.ods` files through `calamine` and
//! converts every sheet into physical rows of typed [`Cell`]s. Nothing here
//! knows about call records; see [`crate::normalizer`] for that.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{
    open_workbook_auto, open_workbook_auto_from_rs, CellErrorType, Data, ExcelDateTime, Range,
    Reader, Sheets,
};
use calllog_core::data_processors::TimestampProcessor;
use calllog_core::formatting::format_hms;
use calllog_core::models::Cell;
use calllog_core::time_utils::{excel_serial_to_time, is_excel_serial};
use calllog_core::{CallLogError, Result};
use tracing::{debug, warn};

// ── Types ─────────────────────────────────────────────────────────────────────

/// One worksheet as physical rows; `rows[0]` is always the sheet's first row,
/// even when the used range starts further down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// All sheets of a workbook, in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read every sheet of the workbook at `path`.
///
/// Any failure to open the file or read one of its sheets is fatal: no
/// partial workbook is returned.
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        warn!("Failed to open workbook {}: {}", path.display(), e);
        CallLogError::WorkbookOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;
    collect_sheets(&mut workbook)
}

/// Read a workbook held in memory, e.g. the body of an upload.
pub fn read_workbook_bytes(bytes: Vec<u8>) -> Result<Workbook> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
        warn!("Failed to decode in-memory workbook: {}", e);
        CallLogError::WorkbookRead(e.to_string())
    })?;
    collect_sheets(&mut workbook)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn collect_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Workbook> {
    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());

    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| CallLogError::SheetRead {
                sheet: name.clone(),
                reason: e.to_string(),
            })?;
        let rows = physical_rows(&range);
        debug!("Sheet \"{}\": {} physical rows", name, rows.len());
        sheets.push(Sheet::new(name, rows));
    }

    Ok(Workbook { sheets })
}

/// Expand a used range back to sheet coordinates so row and column indices
/// are absolute (A1 = `[0][0]`).
fn physical_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let Some((first_row, first_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); first_row as usize];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; first_col as usize];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }
    rows
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s.as_str()),
        Data::Int(n) => Cell::Int(*n),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => datetime_cell(dt),
        Data::DateTimeIso(s) => TimestampProcessor::parse_str(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::text(s.as_str())),
        Data::DurationIso(s) => Cell::text(s.as_str()),
        // `#N/A` marks a missing value, like a blank cell.
        Data::Error(CellErrorType::NA) => Cell::Empty,
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Convert a date-formatted cell, honouring the workbook's 1900/1904 date
/// system. Durations (`[h]:mm:ss`) become `H:MM:SS` text; serials under one
/// day carry only a time of day.
fn datetime_cell(dt: &ExcelDateTime) -> Cell {
    let serial = dt.as_f64();
    if !is_excel_serial(serial) {
        return Cell::Float(serial);
    }

    let converted = if dt.is_duration() {
        dt.as_duration()
            .and_then(|d| u64::try_from(d.num_seconds()).ok())
            .map(|secs| Cell::Text(format_hms(secs)))
    } else if serial < 1.0 {
        excel_serial_to_time(serial).map(Cell::Time)
    } else {
        dt.as_datetime().map(Cell::DateTime)
    };
    converted.unwrap_or(Cell::Float(serial))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
