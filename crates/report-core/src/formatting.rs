/// Round `value` to `decimals` places.
///
/// # Examples
///
/// ```
/// use report_core::formatting::round_to;
///
/// assert_eq!(round_to(92.456, 2), 92.46);
/// assert_eq!(round_to(-3.14159, 3), -3.142);
/// assert_eq!(round_to(7.5, 0), 8.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Format a score-table value: rounded to two decimals, with integral values
/// printed without a fractional part.
///
/// # Examples
///
/// ```
/// use report_core::formatting::format_stat;
///
/// assert_eq!(format_stat(92.5), "92.5");
/// assert_eq!(format_stat(85.0), "85");
/// assert_eq!(format_stat(7.071067), "7.07");
/// assert_eq!(format_stat(-12.004), "-12");
/// ```
pub fn format_stat(value: f64) -> String {
    let rounded = round_to(value, 2);
    if rounded == 0.0 {
        // Avoid printing "-0".
        return "0".to_string();
    }
    format!("{}", rounded)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
