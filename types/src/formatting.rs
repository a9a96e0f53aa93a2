//! Number formatting for rundown reports.
//!
//! Summary tables print meat totals, stat gains and per-turn rates; all of
//! that formatting goes through here so the CLI and any later report
//! writer agree on the output.

/// Insert `,` thousands separators into the digits of `n`.
///
/// # Examples
/// ```
/// use rundown_types::formatting::format_thousands;
/// assert_eq!(format_thousands(0), "0");
/// assert_eq!(format_thousands(1_500), "1,500");
/// assert_eq!(format_thousands(-1_500_000), "-1,500,000");
/// ```
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    if n < 0 {
        result.insert(0, '-');
    }
    result
}

/// Format a gain with an explicit sign, e.g. `+1,200` or `-35`.
///
/// # Examples
/// ```
/// use rundown_types::formatting::format_signed;
/// assert_eq!(format_signed(1_200), "+1,200");
/// assert_eq!(format_signed(-35), "-35");
/// assert_eq!(format_signed(0), "0");
/// ```
pub fn format_signed(n: i64) -> String {
    if n > 0 {
        format!("+{}", format_thousands(n))
    } else {
        format_thousands(n)
    }
}

/// Format a share of `count` out of `total` as a percentage.
///
/// Returns `"0%"` if total is zero.
///
/// # Examples
/// ```
/// use rundown_types::formatting::format_pct_ratio;
/// assert_eq!(format_pct_ratio(3, 10), "30.0%");
/// assert_eq!(format_pct_ratio(0, 0), "0%");
/// ```
pub fn format_pct_ratio(count: u32, total: u32) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", count as f64 / total as f64 * 100.0)
}

/// Format a per-turn rate with two decimals.
///
/// # Examples
/// ```
/// use rundown_types::formatting::format_rate;
/// assert_eq!(format_rate(12.345), "12.35");
/// ```
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}", rate)
}
