//! Filtering and the derived dashboard views.
//!
//! Every function is pure and takes any iterator of record references, so the
//! same code runs over a whole [`CallLog`](calllog_core::models::CallLog) or
//! over a filtered selection. Empty input always produces empty or zeroed
//! views.

use std::collections::{BTreeMap, HashMap};

use calllog_core::models::{CallDate, CallRecord, FilterSpec};
use calllog_core::time_utils::{
    slot_index, weekday_index, weekday_name, BUSINESS_SLOTS, BUSINESS_WEEKDAYS, SLOT_COUNT,
    WEEKDAY_COUNT,
};
use chrono::Weekday;
use serde::Serialize;

// ── View types ────────────────────────────────────────────────────────────────

/// Headline numbers for a selection of calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Kpis {
    /// Number of calls in the selection.
    pub count: usize,
    /// Sum of known durations, in minutes.
    pub total_minutes: f64,
    /// Sum of known durations divided by `count`, in minutes. Calls without a
    /// duration add nothing to the sum but still count.
    pub avg_minutes: f64,
}

/// Number of calls on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: CallDate,
    pub count: usize,
}

/// Number of calls starting in one business-hour slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotCount {
    pub slot: &'static str,
    pub count: usize,
}

/// Number of calls per direction label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectionCount {
    pub direction: String,
    pub count: usize,
}

/// Weekday × slot call counts, Monday to Saturday by the 19 business slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotMatrix {
    pub weekdays: [&'static str; WEEKDAY_COUNT],
    pub slots: [&'static str; SLOT_COUNT],
    /// `counts[weekday][slot]`.
    pub counts: [[usize; SLOT_COUNT]; WEEKDAY_COUNT],
}

impl Default for SlotMatrix {
    fn default() -> Self {
        Self {
            weekdays: BUSINESS_WEEKDAYS.map(weekday_name),
            slots: BUSINESS_SLOTS,
            counts: [[0; SLOT_COUNT]; WEEKDAY_COUNT],
        }
    }
}

impl SlotMatrix {
    /// Count for `day` in slot `slot`; `None` for Sunday or an invalid slot.
    pub fn get(&self, day: Weekday, slot: usize) -> Option<usize> {
        let row = BUSINESS_WEEKDAYS.iter().position(|d| *d == day)?;
        self.counts[row].get(slot).copied()
    }

    /// Sum of every cell.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

// ── CallAggregator ────────────────────────────────────────────────────────────

/// Stateless helper computing the dashboard views.
pub struct CallAggregator;

impl CallAggregator {
    /// Records passing both halves of `spec`, in input order.
    pub fn apply_filter<'a, I>(records: I, spec: &FilterSpec) -> Vec<&'a CallRecord>
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        records.into_iter().filter(|r| spec.matches(r)).collect()
    }

    /// Count, total minutes and average minutes.
    ///
    /// The average divides the sum of known durations by the number of
    /// records, not by the number of records with a duration. An empty
    /// selection yields all zeros.
    pub fn kpis<'a, I>(records: I) -> Kpis
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        // Parseable durations go up to u64::MAX each, so sum in u128.
        let mut count = 0usize;
        let mut total_seconds = 0u128;
        for record in records {
            count += 1;
            total_seconds += u128::from(record.duration_seconds.unwrap_or(0));
        }

        if count == 0 {
            return Kpis::default();
        }

        let total_minutes = total_seconds as f64 / 60.0;
        Kpis {
            count,
            total_minutes,
            avg_minutes: total_minutes / count as f64,
        }
    }

    /// Calls per `date`, ascending: calendar dates first, then sheet labels.
    /// Records without a date are not counted.
    pub fn calls_per_day<'a, I>(records: I) -> Vec<DayCount>
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        // BTreeMap keeps the keys sorted by CallDate's ordering.
        let mut map: BTreeMap<&CallDate, usize> = BTreeMap::new();
        for date in records.into_iter().filter_map(|r| r.date.as_ref()) {
            *map.entry(date).or_insert(0) += 1;
        }
        map.into_iter()
            .map(|(date, count)| DayCount {
                date: date.clone(),
                count,
            })
            .collect()
    }

    /// Calls per business-hour slot. Always returns all 19 slots in order,
    /// including empty ones.
    pub fn calls_by_slot<'a, I>(records: I) -> Vec<SlotCount>
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let mut counts = [0usize; SLOT_COUNT];
        for slot in records.into_iter().filter_map(|r| r.start.and_then(slot_index)) {
            counts[slot] += 1;
        }
        BUSINESS_SLOTS
            .into_iter()
            .zip(counts)
            .map(|(slot, count)| SlotCount { slot, count })
            .collect()
    }

    /// Weekday × slot matrix. Sunday calls, calls without a start and calls
    /// outside business hours are left out.
    pub fn calls_by_day_and_slot<'a, I>(records: I) -> SlotMatrix
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let mut matrix = SlotMatrix::default();
        for start in records.into_iter().filter_map(|r| r.start) {
            if let (Some(day), Some(slot)) = (weekday_index(start), slot_index(start)) {
                matrix.counts[day][slot] += 1;
            }
        }
        matrix
    }

    /// The `n` longest calls, longest first. Calls without a duration sort
    /// after every timed call; ties keep input order.
    pub fn top_n_longest<'a, I>(records: I, n: usize) -> Vec<&'a CallRecord>
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let mut sorted: Vec<&CallRecord> = records.into_iter().collect();
        // `None < Some(_)`, so reversing the comparison pushes `None` last.
        sorted.sort_by(|a, b| b.duration_seconds.cmp(&a.duration_seconds));
        sorted.truncate(n);
        sorted
    }

    /// Calls per direction, most frequent first; ties keep first-appearance
    /// order. Records without a direction are not counted.
    pub fn direction_split<'a, I>(records: I) -> Vec<DirectionCount>
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut split: Vec<DirectionCount> = Vec::new();
        for direction in records.into_iter().filter_map(|r| r.direction.as_deref()) {
            match position.get(direction) {
                Some(&idx) => split[idx].count += 1,
                None => {
                    position.insert(direction, split.len());
                    split.push(DirectionCount {
                        direction: direction.to_string(),
                        count: 1,
                    });
                }
            }
        }
        split.sort_by(|a, b| b.count.cmp(&a.count));
        split
    }

    /// Earliest and latest known date.
    pub fn date_range<'a, I>(records: I) -> Option<(CallDate, CallDate)>
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let mut range: Option<(&CallDate, &CallDate)> = None;
        for date in records.into_iter().filter_map(|r| r.date.as_ref()) {
            range = Some(match range {
                None => (date, date),
                Some((lo, hi)) => (lo.min(date), hi.max(date)),
            });
        }
        range.map(|(lo, hi)| (lo.clone(), hi.clone()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
