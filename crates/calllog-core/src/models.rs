use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

// ── Canonical column names ───────────────────────────────────────────────────

pub const DIRECTION: &str = "direction";
pub const START: &str = "start";
pub const END: &str = "end";
pub const DURATION_STR: &str = "duration_str";
pub const ASSIGNED_TO: &str = "assigned_to";
pub const DATE: &str = "date";
pub const DURATION_SEC: &str = "duration_sec";

/// Source header → canonical column name.
pub const COLUMN_RENAMES: [(&str, &str); 5] = [
    ("Call Type", DIRECTION),
    ("Call Start", START),
    ("Call End", END),
    ("Total Call Time (H:m:s)", DURATION_STR),
    ("Assigned User", ASSIGNED_TO),
];

/// Map a source header to its canonical name; unknown headers pass through.
pub fn canonical_column(header: &str) -> &str {
    COLUMN_RENAMES
        .iter()
        .find(|(source, _)| *source == header)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(header)
}

// ── Cell ─────────────────────────────────────────────────────────────────────

/// A typed workbook cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Calendar date with time of day.
    DateTime(NaiveDateTime),
    /// Time of day only (Excel serials below one day).
    Time(NaiveTime),
}

impl Cell {
    /// Build a text cell, treating blank strings as [`Cell::Empty`].
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Display text of the cell, or `None` when empty.
    ///
    /// Date-times render as `YYYY-MM-DD HH:MM:SS` and times as `HH:MM:SS`,
    /// which is also the form the duration parser sees.
    pub fn display_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::Time(t) => Some(t.format("%H:%M:%S").to_string()),
        }
    }
}

// ── CallDate ─────────────────────────────────────────────────────────────────

/// The `date` of a call: a real calendar date taken from the call start, or
/// the sheet name when the sheet has no start column at all.
///
/// Ordering puts every calendar date (chronologically) before every sheet
/// label (lexically).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum CallDate {
    Calendar(NaiveDate),
    SheetLabel(String),
}

impl fmt::Display for CallDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallDate::Calendar(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CallDate::SheetLabel(label) => f.write_str(label),
        }
    }
}

// ── CallRecord ───────────────────────────────────────────────────────────────

/// One canonical call, built from a single non-empty spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    /// Name of the sheet the row came from.
    pub sheet: String,
    /// Call direction label, e.g. `"Incoming"`.
    pub direction: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// Raw text of the duration cell.
    pub duration_str: Option<String>,
    /// `H*3600 + M*60 + S`, or `None` when `duration_str` is not strict `H:M:S`.
    pub duration_seconds: Option<u64>,
    pub assigned_to: Option<String>,
    /// `None` when the sheet has a start column but this row's start is
    /// unparseable.
    pub date: Option<CallDate>,
    /// Non-canonical columns, carried through for export.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Cell>,
}

impl CallRecord {
    /// An otherwise-empty record belonging to `sheet`.
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            direction: None,
            start: None,
            end: None,
            duration_str: None,
            duration_seconds: None,
            assigned_to: None,
            date: None,
            extra: BTreeMap::new(),
        }
    }
}

// ── CallLog ──────────────────────────────────────────────────────────────────

/// Output of one ingestion: every canonical record plus the column layout
/// needed to export them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallLog {
    /// Sheet names in workbook order.
    pub sheets: Vec<String>,
    /// Export columns in first-appearance order.
    pub columns: Vec<String>,
    pub records: Vec<CallRecord>,
}

impl CallLog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-null `assigned_to` values, in first-appearance order.
    pub fn distinct_assigned(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.assigned_to.as_deref()))
    }

    /// Distinct non-null `direction` values, in first-appearance order.
    pub fn distinct_directions(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.direction.as_deref()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for value in values.flatten() {
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}

// ── Filters ──────────────────────────────────────────────────────────────────

/// Inclusion set for one record field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueFilter {
    /// Allowed non-null values.
    pub allowed: BTreeSet<String>,
    /// Whether records with no value pass.
    #[serde(default)]
    pub include_missing: bool,
}

impl ValueFilter {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            include_missing: false,
        }
    }

    pub fn with_missing(mut self, include_missing: bool) -> Self {
        self.include_missing = include_missing;
        self
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match value {
            Some(v) => self.allowed.contains(v),
            None => self.include_missing,
        }
    }
}

/// The active view: allowed assigned users and allowed directions.
///
/// `FilterSpec::default()` allows nothing. The usual starting point is
/// [`FilterSpec::all_observed`], which allows every value present in a log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub assigned_to: ValueFilter,
    pub direction: ValueFilter,
}

impl FilterSpec {
    /// Allow every distinct non-null value observed in `log`.
    pub fn all_observed(log: &CallLog) -> Self {
        Self {
            assigned_to: ValueFilter::new(log.distinct_assigned()),
            direction: ValueFilter::new(log.distinct_directions()),
        }
    }

    pub fn matches(&self, record: &CallRecord) -> bool {
        self.assigned_to.matches(record.assigned_to.as_deref())
            && self.direction.matches(record.direction.as_deref())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
