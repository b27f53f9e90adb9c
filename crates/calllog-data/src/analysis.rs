//! Top-level pipeline: workbook → [`CallLog`] → [`Dashboard`].
//!
//! Loading is the only fallible step. [`analyze`] applies one filter and
//! computes every view over the same selection, ready for a presentation
//! layer to render.

use std::path::Path;
use std::time::Instant;

use calllog_core::models::{CallDate, CallLog, CallRecord, FilterSpec};
use calllog_core::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::aggregator::{CallAggregator, DayCount, DirectionCount, Kpis, SlotCount, SlotMatrix};
use crate::normalizer::normalize;
use crate::reader::{read_workbook, read_workbook_bytes, Workbook};

// ── Loading ───────────────────────────────────────────────────────────────────

/// Read and normalize the workbook at `path`.
pub fn load_call_log(path: &Path) -> Result<CallLog> {
    let read_start = Instant::now();
    let workbook = read_workbook(path)?;
    let read_time = read_start.elapsed().as_secs_f64();
    Ok(normalize_timed(&workbook, &path.display().to_string(), read_time))
}

/// Read and normalize a workbook held in memory.
pub fn load_call_log_bytes(bytes: Vec<u8>) -> Result<CallLog> {
    let read_start = Instant::now();
    let workbook = read_workbook_bytes(bytes)?;
    let read_time = read_start.elapsed().as_secs_f64();
    Ok(normalize_timed(&workbook, "<memory>", read_time))
}

fn normalize_timed(workbook: &Workbook, source: &str, read_time: f64) -> CallLog {
    let normalize_start = Instant::now();
    let log = normalize(workbook);
    info!(
        "Loaded {} records from {} ({} sheets) in {:.3}s read + {:.3}s normalize",
        log.len(),
        source,
        log.sheets.len(),
        read_time,
        normalize_start.elapsed().as_secs_f64()
    );
    log
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

/// Metadata produced alongside the dashboard views.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetadata {
    /// RFC 3339 timestamp when the dashboard was computed.
    pub generated_at: String,
    /// Sheet names in workbook order.
    pub sheets: Vec<String>,
    /// Records in the whole log.
    pub records_loaded: usize,
    /// Records passing the filter.
    pub records_selected: usize,
    /// Earliest date in the whole log.
    pub first_date: Option<CallDate>,
    /// Latest date in the whole log.
    pub last_date: Option<CallDate>,
}

/// Every view over one filtered selection.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard<'a> {
    pub metadata: DashboardMetadata,
    pub kpis: Kpis,
    pub calls_per_day: Vec<DayCount>,
    pub calls_by_slot: Vec<SlotCount>,
    pub calls_by_day_and_slot: SlotMatrix,
    pub direction_split: Vec<DirectionCount>,
    pub top_longest: Vec<&'a CallRecord>,
    /// The filtered selection itself, for tables and export.
    #[serde(skip)]
    pub records: Vec<&'a CallRecord>,
}

/// Filter `log` with `spec` and compute all views, listing the `top_n`
/// longest calls.
pub fn analyze<'a>(log: &'a CallLog, spec: &FilterSpec, top_n: usize) -> Dashboard<'a> {
    let records = CallAggregator::apply_filter(&log.records, spec);
    let selection = || records.iter().copied();

    let (first_date, last_date) = match CallAggregator::date_range(&log.records) {
        Some((first, last)) => (Some(first), Some(last)),
        None => (None, None),
    };

    let metadata = DashboardMetadata {
        generated_at: Utc::now().to_rfc3339(),
        sheets: log.sheets.clone(),
        records_loaded: log.len(),
        records_selected: records.len(),
        first_date,
        last_date,
    };

    Dashboard {
        metadata,
        kpis: CallAggregator::kpis(selection()),
        calls_per_day: CallAggregator::calls_per_day(selection()),
        calls_by_slot: CallAggregator::calls_by_slot(selection()),
        calls_by_day_and_slot: CallAggregator::calls_by_day_and_slot(selection()),
        direction_split: CallAggregator::direction_split(selection()),
        top_longest: CallAggregator::top_n_longest(selection(), top_n),
        records,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
