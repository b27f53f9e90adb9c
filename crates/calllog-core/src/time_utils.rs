use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Weekday};

// ── Business-hour slots ───────────────────────────────────────────────────────

/// Number of half-hour slots in the business day.
pub const SLOT_COUNT: usize = 19;

/// Half-hour slot labels from 9:30 AM to 6:30 PM inclusive, in display order.
///
/// Shared by the per-slot counts and the weekday × slot matrix so both views
/// always agree on slot membership and ordering.
pub const BUSINESS_SLOTS: [&str; SLOT_COUNT] = [
    "09:30 AM", "10:00 AM", "10:30 AM", "11:00 AM", "11:30 AM", "12:00 PM", "12:30 PM",
    "01:00 PM", "01:30 PM", "02:00 PM", "02:30 PM", "03:00 PM", "03:30 PM", "04:00 PM",
    "04:30 PM", "05:00 PM", "05:30 PM", "06:00 PM", "06:30 PM",
];

/// Minutes after midnight of the first slot (09:30).
const FIRST_SLOT_MINUTE: u32 = 9 * 60 + 30;

/// Minutes after midnight of the last slot (18:30).
const LAST_SLOT_MINUTE: u32 = 18 * 60 + 30;

/// Floor `ts` down to the start of its half hour (`10:47:12` → `10:30:00`).
pub fn floor_to_half_hour(ts: NaiveDateTime) -> NaiveDateTime {
    let excess = i64::from(ts.minute() % 30) * 60 + i64::from(ts.second());
    ts - Duration::seconds(excess) - Duration::nanoseconds(i64::from(ts.nanosecond()))
}

/// 12-hour label of the half hour containing `ts`, e.g. `"09:30 AM"`.
///
/// Returned for any time of day, including ones outside business hours.
pub fn slot_label(ts: NaiveDateTime) -> String {
    floor_to_half_hour(ts).format("%I:%M %p").to_string()
}

/// Position of `ts`'s half hour within [`BUSINESS_SLOTS`], or `None` when it
/// falls outside 09:30–18:59.
pub fn slot_index(ts: NaiveDateTime) -> Option<usize> {
    let minute_of_day = ts.hour() * 60 + ts.minute();
    let floored = minute_of_day - minute_of_day % 30;
    if !(FIRST_SLOT_MINUTE..=LAST_SLOT_MINUTE).contains(&floored) {
        return None;
    }
    Some(((floored - FIRST_SLOT_MINUTE) / 30) as usize)
}

// ── Weekdays ─────────────────────────────────────────────────────────────────

/// Number of business weekdays (Monday to Saturday).
pub const WEEKDAY_COUNT: usize = 6;

/// Business weekdays in display order. Sunday is deliberately absent.
pub const BUSINESS_WEEKDAYS: [Weekday; WEEKDAY_COUNT] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Position of `ts`'s weekday within [`BUSINESS_WEEKDAYS`]; `None` on Sunday.
pub fn weekday_index(ts: NaiveDateTime) -> Option<usize> {
    match ts.weekday() {
        Weekday::Sun => None,
        day => Some(day.num_days_from_monday() as usize),
    }
}

/// Full English name of `day` (`"Monday"`).
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── Excel serial dates ───────────────────────────────────────────────────────

/// Largest serial Excel can represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// Whether `serial` lies in the range Excel can display as a date or time.
pub fn is_excel_serial(serial: f64) -> bool {
    serial.is_finite() && (0.0..MAX_EXCEL_SERIAL).contains(&serial)
}

/// Convert the fractional part of an Excel serial into a time of day.
pub fn excel_serial_to_time(serial: f64) -> Option<NaiveTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let seconds = ((serial.fract() * 86_400.0).round() as u32) % 86_400;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
