/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use calllog_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Minutes with one decimal place, as shown on the KPI cards (`"135.0"`).
pub fn format_minutes(minutes: f64) -> String {
    format_number(minutes, 1)
}

/// Render a duration in seconds as `H:MM:SS`.
///
/// ```
/// use calllog_core::formatting::format_hms;
///
/// assert_eq!(format_hms(5400), "1:30:00");
/// assert_eq!(format_hms(59), "0:00:59");
/// ```
pub fn format_hms(seconds: u64) -> String {
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// `part` as a percentage of `whole`, rounded to `decimal_places`.
///
/// Returns `0.0` when `whole` is zero.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let factor = 10_f64.powi(decimal_places as i32);
    ((part / whole) * 100.0 * factor).round() / factor
}

/// Insert commas every three digits from the right of a digit string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
        assert_eq!(format_number(100_000.0, 0), "100,000");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(format_number(-0.01, 1), "0.0");
    }

    // ── format_minutes ───────────────────────────────────────────────────────

    #[test]
    fn test_format_minutes_one_decimal() {
        assert_eq!(format_minutes(135.0), "135.0");
        assert_eq!(format_minutes(45.26), "45.3");
        assert_eq!(format_minutes(1_500.0), "1,500.0");
    }

    // ── format_hms ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "0:00:00");
        assert_eq!(format_hms(3723), "1:02:03");
        assert_eq!(format_hms(93_601), "26:00:01");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        let p = percentage(50.0, 200.0, 1);
        assert!((p - 25.0).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_percentage_rounding() {
        let p = percentage(1.0, 3.0, 2);
        assert!((p - 33.33).abs() < 1e-9, "percentage = {p}");
    }
}
