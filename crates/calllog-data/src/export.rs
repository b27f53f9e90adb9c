//! CSV export of a record selection.
//!
//! UTF-8, comma-separated, one header row, one row per record. Canonical
//! fields and pass-through columns share the column order recorded on the
//! [`CallLog`](calllog_core::models::CallLog).

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use calllog_core::models::{
    CallRecord, ASSIGNED_TO, DATE, DIRECTION, DURATION_SEC, DURATION_STR, END, START,
};
use calllog_core::Result;
use chrono::NaiveDateTime;
use tracing::info;

/// Write `columns` as the header and one row per record to `writer`.
///
/// Returns the number of data rows written.
pub fn write_csv<'a, W, I>(writer: W, columns: &[String], records: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a CallRecord>,
{
    if columns.is_empty() {
        return Ok(0);
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(columns).map_err(io::Error::from)?;

    let mut rows = 0usize;
    for record in records {
        let fields = columns.iter().map(|column| field_value(record, column));
        csv_writer.write_record(fields).map_err(io::Error::from)?;
        rows += 1;
    }
    csv_writer.flush()?;
    Ok(rows)
}

/// Export into an in-memory buffer, e.g. for a download response.
pub fn to_csv_bytes<'a, I>(columns: &[String], records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a CallRecord>,
{
    let mut buffer = Vec::new();
    write_csv(&mut buffer, columns, records)?;
    Ok(buffer)
}

/// Export to a file at `path`, replacing any existing file.
pub fn write_csv_file<'a, I>(path: &Path, columns: &[String], records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a CallRecord>,
{
    let file = File::create(path)?;
    let rows = write_csv(file, columns, records)?;
    info!("Exported {} records to {}", rows, path.display());
    Ok(rows)
}

/// Text of one export cell; missing values are empty.
fn field_value(record: &CallRecord, column: &str) -> String {
    match column {
        DIRECTION => record.direction.clone().unwrap_or_default(),
        START => format_timestamp(record.start),
        END => format_timestamp(record.end),
        DURATION_STR => record.duration_str.clone().unwrap_or_default(),
        ASSIGNED_TO => record.assigned_to.clone().unwrap_or_default(),
        DATE => record.date.as_ref().map(ToString::to_string).unwrap_or_default(),
        DURATION_SEC => record
            .duration_seconds
            .map(|s| s.to_string())
            .unwrap_or_default(),
        other => record
            .extra
            .get(other)
            .and_then(|cell| cell.display_text())
            .unwrap_or_default(),
    }
}

fn format_timestamp(ts: Option<NaiveDateTime>) -> String {
    ts.map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use calllog_core::models::{CallDate, Cell};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> CallRecord {
        let start = NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(9, 45, 0)
            .unwrap();
        let mut record = CallRecord::new("March");
        record.direction = Some("Incoming".to_string());
        record.start = Some(start);
        record.duration_str = Some("01:30:00".to_string());
        record.duration_seconds = Some(5400);
        record.assigned_to = Some("Ana, Jr.".to_string());
        record.date = Some(CallDate::Calendar(start.date()));
        record
            .extra
            .insert("Caller ID".to_string(), Cell::Int(5550100));
        record
    }

    #[test]
    fn test_csv_header_and_row() {
        let cols = columns(&[
            "direction",
            "start",
            "end",
            "duration_str",
            "assigned_to",
            "Caller ID",
            "date",
            "duration_sec",
        ]);
        let records = vec![sample()];
        let bytes = to_csv_bytes(&cols, &records).expect("export");
        let text = String::from_utf8(bytes).expect("utf-8");

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("direction,start,end,duration_str,assigned_to,Caller ID,date,duration_sec")
        );
        assert_eq!(
            lines.next(),
            Some("Incoming,2024-03-11 09:45:00,,01:30:00,\"Ana, Jr.\",5550100,2024-03-11,5400")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_missing_values_are_empty() {
        let cols = columns(&["direction", "date", "duration_sec", "Queue"]);
        let mut record = CallRecord::new("Archive");
        record.date = Some(CallDate::SheetLabel("Archive".to_string()));
        let records = vec![record];

        let text = String::from_utf8(to_csv_bytes(&cols, &records).unwrap()).unwrap();
        assert_eq!(text, "direction,date,duration_sec,Queue\n,Archive,,\n");
    }

    #[test]
    fn test_csv_empty_selection_writes_header_only() {
        let cols = columns(&["direction", "duration_sec"]);
        let text = String::from_utf8(to_csv_bytes(&cols, &Vec::<CallRecord>::new()).unwrap())
            .unwrap();
        assert_eq!(text, "direction,duration_sec\n");
    }

    #[test]
    fn test_write_csv_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("filtered_calls.csv");
        let cols = columns(&["assigned_to", "duration_sec"]);
        let records = vec![sample(), sample()];

        let rows = write_csv_file(&path, &cols, &records).expect("export");
        assert_eq!(rows, 2);

        let text = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(text.lines().count(), 3);
    }
}
