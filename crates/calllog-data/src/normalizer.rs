//! Sheet → canonical [`CallRecord`] normalization.
//!
//! Every sheet uses its second physical row as the header row. Known source
//! headers are renamed to canonical fields, everything else is carried along
//! as a pass-through column. Cells that fail to parse become `None`; a bad
//! cell never aborts the ingestion.

use std::collections::HashSet;

use calllog_core::data_processors::{DurationParser, TimestampProcessor};
use calllog_core::models::{
    canonical_column, CallDate, CallLog, CallRecord, Cell, ASSIGNED_TO, DATE, DIRECTION,
    DURATION_SEC, DURATION_STR, END, START,
};
use tracing::{debug, info};

use crate::reader::{Sheet, Workbook};

/// Zero-based physical row holding the column headers. The row above it is a
/// decorative title.
pub const HEADER_ROW: usize = 1;

/// Columns the normalizer derives itself; source columns with these names
/// are overwritten rather than passed through.
const DERIVED_COLUMNS: [&str; 2] = [DATE, DURATION_SEC];

static EMPTY_CELL: Cell = Cell::Empty;

// ── Public API ────────────────────────────────────────────────────────────────

/// Normalize every sheet of `workbook` and concatenate the results, sheets in
/// workbook order and rows in sheet order.
pub fn normalize(workbook: &Workbook) -> CallLog {
    let mut log = CallLog::default();
    let mut seen_columns: HashSet<String> = HashSet::new();

    for sheet in &workbook.sheets {
        let normalized = normalize_sheet(sheet);

        for column in normalized.columns.iter().map(String::as_str).chain([DATE]) {
            if seen_columns.insert(column.to_string()) {
                log.columns.push(column.to_string());
            }
        }
        log.sheets.push(sheet.name.clone());
        log.records.extend(normalized.records);
    }

    if seen_columns.insert(DURATION_SEC.to_string()) {
        log.columns.push(DURATION_SEC.to_string());
    }

    info!(
        "Normalized {} records from {} sheets",
        log.records.len(),
        log.sheets.len()
    );
    log
}

// ── Per-sheet normalization ───────────────────────────────────────────────────

/// Records and export columns produced by one sheet.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSheet {
    /// Renamed header columns, derived columns excluded.
    pub columns: Vec<String>,
    pub records: Vec<CallRecord>,
}

/// Header positions of the canonical fields within one sheet.
#[derive(Debug, Default)]
struct ColumnIndex {
    direction: Option<usize>,
    start: Option<usize>,
    end: Option<usize>,
    duration: Option<usize>,
    assigned_to: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            direction: find(DIRECTION),
            start: find(START),
            end: find(END),
            duration: find(DURATION_STR),
            assigned_to: find(ASSIGNED_TO),
        }
    }

    fn is_canonical(&self, col: usize) -> bool {
        [
            self.direction,
            self.start,
            self.end,
            self.duration,
            self.assigned_to,
        ]
        .contains(&Some(col))
    }
}

/// Normalize a single sheet.
pub fn normalize_sheet(sheet: &Sheet) -> NormalizedSheet {
    let Some(header_row) = sheet.rows.get(HEADER_ROW) else {
        debug!("Sheet \"{}\" has no header row; skipping", sheet.name);
        return NormalizedSheet::default();
    };

    let width = sheet
        .rows
        .iter()
        .skip(HEADER_ROW)
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    let headers = build_headers(header_row, width);
    let index = ColumnIndex::from_headers(&headers);

    let mut records = Vec::new();
    let mut empty_rows = 0usize;
    let mut bad_starts = 0usize;
    let mut bad_durations = 0usize;

    for row in sheet.rows.iter().skip(HEADER_ROW + 1) {
        if row.iter().all(Cell::is_empty) {
            empty_rows += 1;
            continue;
        }
        let cell = |col: Option<usize>| cell_at(row, col);

        let mut record = CallRecord::new(sheet.name.as_str());
        record.direction = cell(index.direction).display_text();
        record.assigned_to = cell(index.assigned_to).display_text();
        record.start = TimestampProcessor::parse(cell(index.start));
        record.end = TimestampProcessor::parse(cell(index.end));

        let (duration_str, duration_seconds) = DurationParser::from_cell(cell(index.duration));
        record.duration_str = duration_str;
        record.duration_seconds = duration_seconds;

        // A sheet without a start column is labelled with its own name; a
        // present-but-unparseable start leaves the date missing.
        record.date = match index.start {
            Some(_) => record.start.map(|dt| CallDate::Calendar(dt.date())),
            None => Some(CallDate::SheetLabel(sheet.name.clone())),
        };

        if index.start.is_some() && record.start.is_none() && !cell(index.start).is_empty() {
            bad_starts += 1;
        }
        if record.duration_str.is_some() && record.duration_seconds.is_none() {
            bad_durations += 1;
        }

        for (col, header) in headers.iter().enumerate() {
            if index.is_canonical(col) || DERIVED_COLUMNS.contains(&header.as_str()) {
                continue;
            }
            let value = cell(Some(col));
            if !value.is_empty() {
                record.extra.insert(header.clone(), value.clone());
            }
        }

        records.push(record);
    }

    debug!(
        "Sheet \"{}\": {} records, {} empty rows dropped, {} unparseable starts, {} unparseable durations",
        sheet.name,
        records.len(),
        empty_rows,
        bad_starts,
        bad_durations
    );

    let columns = headers
        .into_iter()
        .filter(|h| !DERIVED_COLUMNS.contains(&h.as_str()))
        .collect();

    NormalizedSheet { columns, records }
}

fn cell_at(row: &[Cell], col: Option<usize>) -> &Cell {
    col.and_then(|c| row.get(c)).unwrap_or(&EMPTY_CELL)
}

/// Header names for `width` columns: blank headers become `Unnamed: <n>`,
/// repeats get `.1`, `.2`, … suffixes, then canonical renames apply.
fn build_headers(header_row: &[Cell], width: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(width);

    for col in 0..width {
        let base = header_row
            .get(col)
            .and_then(Cell::display_text)
            .unwrap_or_else(|| format!("Unnamed: {}", col));

        let mut name = base.clone();
        let mut suffix = 1;
        while !seen.insert(name.clone()) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        headers.push(name);
    }

    headers
        .into_iter()
        .map(|h| canonical_column(&h).to_string())
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn t(s: &str) -> Cell {
        Cell::text(s)
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn title() -> Vec<Cell> {
        vec![t("Call Report")]
    }

    fn standard_header() -> Vec<Cell> {
        vec![
            t("Call Type"),
            t("Call Start"),
            t("Call End"),
            t("Total Call Time (H:m:s)"),
            t("Assigned User"),
            t("Caller ID"),
        ]
    }

    fn call(direction: &str, start: &str, duration: &str, user: &str) -> Vec<Cell> {
        vec![
            t(direction),
            t(start),
            Cell::Empty,
            t(duration),
            t(user),
            t("555-0100"),
        ]
    }

    fn standard_sheet(name: &str, calls: Vec<Vec<Cell>>) -> Sheet {
        let mut rows = vec![title(), standard_header()];
        rows.extend(calls);
        Sheet::new(name, rows)
    }

    // ── field mapping ─────────────────────────────────────────────────────────

    #[test]
    fn test_maps_canonical_fields() {
        let sheet = standard_sheet(
            "March",
            vec![call("Incoming", "2024-03-11 09:45:00", "01:30:00", "Ana")],
        );
        let log = normalize(&Workbook { sheets: vec![sheet] });

        assert_eq!(log.len(), 1);
        let r = &log.records[0];
        assert_eq!(r.sheet, "March");
        assert_eq!(r.direction.as_deref(), Some("Incoming"));
        assert_eq!(r.start, Some(ts("2024-03-11 09:45:00")));
        assert_eq!(r.end, None);
        assert_eq!(r.duration_str.as_deref(), Some("01:30:00"));
        assert_eq!(r.duration_seconds, Some(5400));
        assert_eq!(r.assigned_to.as_deref(), Some("Ana"));
        assert_eq!(
            r.date,
            Some(CallDate::Calendar(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()))
        );
        assert_eq!(r.extra.get("Caller ID"), Some(&t("555-0100")));
    }

    #[test]
    fn test_title_row_is_ignored() {
        // The title row looks like a header; only physical row 2 counts.
        let sheet = Sheet::new(
            "S",
            vec![
                vec![t("Call Type"), t("Assigned User")],
                vec![t("Assigned User"), t("Call Type")],
                vec![t("Ana"), t("Incoming")],
            ],
        );
        let log = normalize(&Workbook { sheets: vec![sheet] });
        assert_eq!(log.records[0].assigned_to.as_deref(), Some("Ana"));
        assert_eq!(log.records[0].direction.as_deref(), Some("Incoming"));
    }

    #[test]
    fn test_durations_degrade_to_none() {
        let sheet = standard_sheet(
            "S",
            vec![
                call("Incoming", "2024-03-11 09:45:00", "01:30:00", "Ana"),
                call("Incoming", "2024-03-11 10:45:00", "00:45:00", "Ana"),
                call("Incoming", "2024-03-11 11:45:00", "bad", "Ana"),
                call("Incoming", "2024-03-11 12:45:00", "", "Ana"),
            ],
        );
        let log = normalize(&Workbook { sheets: vec![sheet] });
        let durations: Vec<Option<u64>> = log.records.iter().map(|r| r.duration_seconds).collect();
        assert_eq!(durations, [Some(5400), Some(2700), None, None]);
    }

    #[test]
    fn test_time_cell_duration_parses() {
        let mut row = call("Incoming", "2024-03-11 09:45:00", "", "Ana");
        row[3] = Cell::Time(NaiveTime::from_hms_opt(0, 2, 5).unwrap());
        let log = normalize(&Workbook {
            sheets: vec![standard_sheet("S", vec![row])],
        });
        assert_eq!(log.records[0].duration_seconds, Some(125));
    }

    // ── empty rows ────────────────────────────────────────────────────────────

    #[test]
    fn test_drops_fully_empty_rows_only() {
        let sheet = standard_sheet(
            "S",
            vec![
                call("Incoming", "2024-03-11 09:45:00", "01:30:00", "Ana"),
                vec![Cell::Empty; 6],
                vec![],
                vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, t("Bea")],
            ],
        );
        let log = normalize(&Workbook { sheets: vec![sheet] });
        assert_eq!(log.len(), 2);
        assert_eq!(log.records[1].assigned_to.as_deref(), Some("Bea"));
        assert_eq!(log.records[1].direction, None);
    }

    #[test]
    fn test_row_count_is_sum_of_non_empty_rows() {
        let a = standard_sheet(
            "A",
            vec![
                call("Incoming", "2024-03-11 09:45:00", "01:30:00", "Ana"),
                vec![Cell::Empty; 6],
                call("Outgoing", "2024-03-11 10:15:00", "00:05:00", "Bea"),
            ],
        );
        let b = standard_sheet(
            "B",
            vec![call("Outgoing", "2024-03-12 10:15:00", "00:05:00", "Bea")],
        );
        let empty = Sheet::new("Empty", vec![]);
        let log = normalize(&Workbook {
            sheets: vec![a, b, empty],
        });

        assert_eq!(log.len(), 3);
        assert_eq!(log.sheets, ["A", "B", "Empty"]);
        let sheets: Vec<&str> = log.records.iter().map(|r| r.sheet.as_str()).collect();
        assert_eq!(sheets, ["A", "A", "B"]);
    }

    // ── date fallback ─────────────────────────────────────────────────────────

    #[test]
    fn test_missing_start_column_uses_sheet_name() {
        let sheet = Sheet::new(
            "2024-03-15",
            vec![
                title(),
                vec![t("Call Type"), t("Assigned User")],
                vec![t("Incoming"), t("Ana")],
                vec![t("Outgoing"), t("Bea")],
            ],
        );
        let log = normalize(&Workbook { sheets: vec![sheet] });
        for r in &log.records {
            assert_eq!(r.date, Some(CallDate::SheetLabel("2024-03-15".to_string())));
            assert_eq!(r.start, None);
        }
    }

    #[test]
    fn test_unparseable_start_leaves_date_missing() {
        let sheet = standard_sheet(
            "Sheet Name",
            vec![call("Incoming", "not a time", "00:01:00", "Ana")],
        );
        let log = normalize(&Workbook { sheets: vec![sheet] });
        assert_eq!(log.records[0].start, None);
        assert_eq!(log.records[0].date, None);
    }

    // ── headers and columns ───────────────────────────────────────────────────

    #[test]
    fn test_build_headers_unnamed_and_duplicates() {
        let headers = build_headers(
            &[t("Notes"), Cell::Empty, t("Notes"), t("Call Type"), t("Notes")],
            6,
        );
        assert_eq!(
            headers,
            ["Notes", "Unnamed: 1", "Notes.1", "direction", "Notes.2", "Unnamed: 5"]
        );
    }

    #[test]
    fn test_export_columns_union_in_first_appearance_order() {
        let a = Sheet::new(
            "A",
            vec![
                title(),
                vec![t("Call Type"), t("Caller ID")],
                vec![t("Incoming"), t("555")],
            ],
        );
        let b = Sheet::new(
            "B",
            vec![
                title(),
                vec![t("Call Start"), t("Call Type"), t("Queue")],
                vec![t("2024-03-11 09:45:00"), t("Outgoing"), t("Sales")],
            ],
        );
        let log = normalize(&Workbook { sheets: vec![a, b] });
        assert_eq!(
            log.columns,
            ["direction", "Caller ID", "date", "start", "Queue", "duration_sec"]
        );
    }

    #[test]
    fn test_source_date_column_is_overwritten() {
        let sheet = Sheet::new(
            "S",
            vec![
                title(),
                vec![t("Call Start"), t("date")],
                vec![t("2024-03-11 09:45:00"), t("whatever")],
            ],
        );
        let log = normalize(&Workbook { sheets: vec![sheet] });
        assert!(log.records[0].extra.is_empty());
        assert_eq!(log.columns, ["start", "date", "duration_sec"]);
    }

    #[test]
    fn test_sheet_without_header_row_yields_nothing() {
        let sheet = Sheet::new("Cover", vec![title()]);
        let log = normalize(&Workbook { sheets: vec![sheet] });
        assert!(log.is_empty());
        assert_eq!(log.sheets, ["Cover"]);
    }

    #[test]
    fn test_empty_workbook() {
        let log = normalize(&Workbook::default());
        assert!(log.is_empty());
        assert_eq!(log.columns, ["duration_sec"]);
    }
}
