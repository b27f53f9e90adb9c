use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::Cell;

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses call start/end timestamps from workbook cells.
///
/// Parsing is permissive and never fails loudly: anything that is not a
/// recognisable date-time becomes `None`.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Attempt to turn a [`Cell`] into a naive local [`NaiveDateTime`].
    ///
    /// Handles:
    /// * native date-time cells → as-is
    /// * text → RFC 3339 (offset dropped) or one of the common patterns below
    /// * everything else (numbers, booleans, time-only cells) → `None`
    pub fn parse(cell: &Cell) -> Option<NaiveDateTime> {
        match cell {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Text(s) => Self::parse_str(s),
            _ => None,
        }
    }

    pub fn parse_str(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        // Replace trailing 'Z' with '+00:00' for RFC 3339 compatibility.
        let normalised = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.naive_local());
        }

        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y/%m/%d %H:%M:%S",
            "%m/%d/%Y %H:%M:%S",
            "%m/%d/%Y %H:%M",
            "%m/%d/%Y %I:%M:%S %p",
            "%m/%d/%Y %I:%M %p",
            "%d-%b-%Y %H:%M:%S",
            "%b %d, %Y %I:%M:%S %p",
        ];
        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y"];
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        None
    }
}

// ── DurationParser ───────────────────────────────────────────────────────────

/// Strict `H:M:S` duration parsing.
pub struct DurationParser;

impl DurationParser {
    /// Parse `"H:M:S"` into seconds.
    ///
    /// Exactly three `:`-separated tokens are required, each a non-negative
    /// integer once surrounding whitespace is trimmed. Minutes and seconds are
    /// not range-checked (`"0:90:00"` is 5400). Any other input is `None`.
    pub fn parse(s: &str) -> Option<u64> {
        let mut parts = s.split(':');
        let (h, m, sec) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let h: u64 = h.trim().parse().ok()?;
        let m: u64 = m.trim().parse().ok()?;
        let sec: u64 = sec.trim().parse().ok()?;
        h.checked_mul(3600)?
            .checked_add(m.checked_mul(60)?)?
            .checked_add(sec)
    }

    /// The duration text of a cell together with its parsed seconds.
    pub fn from_cell(cell: &Cell) -> (Option<String>, Option<u64>) {
        let text = cell.display_text();
        let seconds = text.as_deref().and_then(Self::parse);
        (text, seconds)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
