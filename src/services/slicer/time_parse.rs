//! Heuristic time-estimate extraction from freeform slicer text.
//!
//! Slicer builds disagree on how they print time estimates, so this is an
//! ordered pattern cascade rather than a grammar. Labeled forms come before
//! bare forms so an unrelated number elsewhere in the text cannot shadow
//! the actual estimate.

use regex::Regex;
use std::sync::LazyLock;

/// Time patterns in strict priority order; the first one that matches wins.
static TIME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)estimated\s+time[:\s]+(\d+)\s*h(?:ours?)?\s*(\d+)\s*m(?:in(?:utes?)?)?",
        r"(?i)estimated\s+time[:\s]+(\d+)\s*m(?:in(?:utes?)?)",
        r"(?i)time[:\s]+(\d+)\s*h(?:ours?)?\s*(\d+)\s*m(?:in(?:utes?)?)?",
        r"(?i)time[:\s]+(\d+)\s*m(?:in(?:utes?)?)",
        r"(?i)(\d+)\s*h(?:ours?)?\s*(\d+)\s*m(?:in(?:utes?)?)?",
        r"(?i)(\d+)\s*m(?:in(?:utes?)?)",
        r"(?i)(\d+)\s*h(?:ours?)?",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid regex"))
    .collect()
});

/// Extract a time estimate in minutes from freeform text.
///
/// An hour+minute match yields `hours * 60 + minutes`. A single-number
/// match is multiplied by 60 only when the matched span carries an hour
/// marker, otherwise it is taken as minutes. No match is absence, not an
/// error.
pub fn parse_time_estimate(text: &str) -> Option<f64> {
    for re in TIME_PATTERNS.iter() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let matched = caps.get(0).map_or("", |m| m.as_str());

        match (caps.get(1), caps.get(2)) {
            (Some(hours), Some(minutes)) => {
                if let (Ok(h), Ok(m)) = (
                    hours.as_str().parse::<f64>(),
                    minutes.as_str().parse::<f64>(),
                ) {
                    return Some(h * 60.0 + m);
                }
            }
            (Some(value), None) => {
                if let Ok(v) = value.as_str().parse::<f64>() {
                    if matched.to_lowercase().contains('h') {
                        return Some(v * 60.0);
                    }
                    return Some(v);
                }
            }
            _ => {}
        }
    }

    None
}
