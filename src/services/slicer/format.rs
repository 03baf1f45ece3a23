//! Shared formatting rules for durations, deltas and percentages.
//!
//! Every component goes through these helpers so "1h 15m" means the same
//! thing in a metadata record, a metrics record and a recommendation.

/// Format a duration in minutes as "2h 5m" / "45m" / "3h". Zero is "0m".
pub fn format_duration(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor() as i64;
    let mins = (minutes % 60.0) as i64;

    if hours > 0 && mins > 0 {
        format!("{hours}h {mins}m")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{mins}m")
    }
}

/// Format a signed time difference, e.g. "+1h 30m" or "-45m". Zero is "+0m".
pub fn format_delta(minutes: f64) -> String {
    let sign = if minutes < 0.0 { '-' } else { '+' };
    format!("{sign}{}", format_duration(minutes.abs()))
}

/// Format a batch total. Fractional hours below one day, day granularity
/// once the total reaches 24 hours.
pub fn format_batch_duration(total_minutes: f64) -> String {
    let total_hours = total_minutes / 60.0;
    let days = (total_hours / 24.0).floor() as i64;
    let hours = (total_hours % 24.0) as i64;

    if days > 0 {
        format!(
            "{days} day{}, {hours} hour{}",
            plural(days),
            plural(hours)
        )
    } else {
        format!("{total_hours:.1} hours")
    }
}

/// Format a density value as a percentage string. Integral values drop the
/// fraction: 20.0 renders as "20%", 12.5 as "12.5%".
pub fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}%", value as i64)
    } else {
        format!("{value}%")
    }
}

/// Truncate a message to at most `limit` characters for display.
pub fn truncate_message(message: &str, limit: usize) -> String {
    message.chars().take(limit).collect()
}

/// Round to two decimals at the presentation boundary.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal at the presentation boundary.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
