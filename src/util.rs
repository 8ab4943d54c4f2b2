/// Integer division rounding up. A zero divisor yields zero.
pub fn ceil_div(numerator: u64, denominator: u64) -> u64 {
    match denominator {
        0 => 0,
        d => numerator.div_ceil(d),
    }
}

/// `round(100 * part / whole)` with halves rounded up. A zero whole yields zero.
pub fn rounded_percent(part: u64, whole: u64) -> u64 {
    match whole {
        0 => 0,
        w => (200 * part + w) / (2 * w),
    }
}

/// Render a second count as `HH:MM:SS`
pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
