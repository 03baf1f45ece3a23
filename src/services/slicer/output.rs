//! Interpretation of slicer CLI output into canonical metrics.
//!
//! Two strategies, tried in order:
//! 1. A JSON result file staged in the output directory.
//! 2. Regex heuristics over the combined stdout/stderr text.
//!
//! The JSON strategy is terminal: fields its key list misses stay `None`
//! and it never collects text-derived warnings, even when warning-bearing
//! text is available. That asymmetry is long-standing observed behavior
//! and is kept as-is (covered by a regression test).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::logging::DiagnosticSink;
use crate::services::slicer::{format, time_parse, SliceOutcome, FILAMENT_COST_PER_GRAM};
use crate::types::errors::{SliceError, SliceResult};
use crate::types::metrics::SliceMetrics;

/// Warning lines collected from text output are capped here.
const MAX_WARNINGS: usize = 5;

/// Alternate key names accepted per field in JSON output.
const TIME_KEYS: &[&str] = &["estimated_time_minutes", "time_minutes"];
const WEIGHT_KEYS: &[&str] = &["filament_weight_grams", "weight_grams"];
const LENGTH_KEYS: &[&str] = &["filament_length_meters", "length_meters"];

/// Weight-in-grams patterns, priority order, first match wins.
static WEIGHT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)filament\s+weight[:\s]+(\d+\.?\d*)\s*g(?:rams?)?",
        r"(?i)weight[:\s]+(\d+\.?\d*)\s*g(?:rams?)?",
        r"(?i)(\d+\.?\d*)\s*g(?:rams?)?\s+filament",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid regex"))
    .collect()
});

/// Length-in-meters patterns, priority order, first match wins.
static LENGTH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)filament\s+length[:\s]+(\d+\.?\d*)\s*m(?:eters?)?",
        r"(?i)length[:\s]+(\d+\.?\d*)\s*m(?:eters?)?",
        r"(?i)(\d+\.?\d*)\s*m(?:eters?)?\s+filament",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid regex"))
    .collect()
});

pub struct OutputInterpreter<'a> {
    sink: &'a dyn DiagnosticSink,
}

impl<'a> OutputInterpreter<'a> {
    pub fn new(sink: &'a dyn DiagnosticSink) -> Self {
        Self { sink }
    }

    /// Map a finished invocation to metrics, or to a failure on nonzero
    /// exit. The failure carries the full tool output; truncation happens
    /// at the presentation boundary only.
    pub fn interpret_outcome(
        &self,
        outcome: &SliceOutcome,
        output_dir: &Path,
    ) -> SliceResult<SliceMetrics> {
        if outcome.exit_code != 0 {
            let message = if outcome.stderr.is_empty() {
                &outcome.stdout
            } else {
                &outcome.stderr
            };
            return Err(SliceError::ExternalToolFailure(message.clone()));
        }
        Ok(self.interpret(output_dir, &outcome.stdout, &outcome.stderr))
    }

    /// Extract metrics from whatever the invocation left behind.
    pub fn interpret(&self, output_dir: &Path, stdout: &str, stderr: &str) -> SliceMetrics {
        if let Some(metrics) = self.try_json_file(output_dir) {
            return metrics;
        }
        self.from_text(stdout, stderr)
    }

    /// JSON strategy: read the first JSON file in the output directory.
    /// Returns `None` (falling through to text) only when no JSON file
    /// exists or the file itself cannot be read/parsed.
    fn try_json_file(&self, output_dir: &Path) -> Option<SliceMetrics> {
        let path = first_json_file(output_dir)?;

        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<Value>(&content).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(data) => Some(build_metrics(
                first_number(&data, TIME_KEYS),
                first_number(&data, WEIGHT_KEYS),
                first_number(&data, LENGTH_KEYS),
                Vec::new(),
            )),
            Err(e) => {
                self.sink.warn(&format!(
                    "Could not parse JSON output {}: {e}",
                    path.display()
                ));
                None
            }
        }
    }

    /// Text strategy: independent pattern cascades over stdout + stderr.
    fn from_text(&self, stdout: &str, stderr: &str) -> SliceMetrics {
        let combined = format!("{stdout}\n{stderr}");

        build_metrics(
            time_parse::parse_time_estimate(&combined),
            first_capture(&WEIGHT_PATTERNS, &combined),
            first_capture(&LENGTH_PATTERNS, &combined),
            collect_warnings(&combined),
        )
    }
}

/// First JSON file in the directory, by name, for deterministic selection.
fn first_json_file(output_dir: &Path) -> Option<PathBuf> {
    let mut json_files: Vec<PathBuf> = fs::read_dir(output_dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    json_files.sort();
    json_files.into_iter().next()
}

fn first_number(data: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| data.get(key).and_then(Value::as_f64))
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<f64> {
    for re in patterns {
        if let Some(caps) = re.captures(text) {
            if let Some(value) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                return Some(value);
            }
        }
    }
    None
}

fn collect_warnings(combined: &str) -> Vec<String> {
    let lower = combined.to_lowercase();
    if !lower.contains("warning") && !lower.contains("error") {
        return Vec::new();
    }

    combined
        .lines()
        .filter(|line| {
            let line = line.to_lowercase();
            line.contains("warning") || line.contains("error")
        })
        .map(|line| line.trim().to_string())
        .take(MAX_WARNINGS)
        .collect()
}

fn build_metrics(
    time_minutes: Option<f64>,
    weight_grams: Option<f64>,
    length_meters: Option<f64>,
    warnings: Vec<String>,
) -> SliceMetrics {
    SliceMetrics {
        estimated_time_minutes: time_minutes,
        estimated_time_formatted: time_minutes.map(format::format_duration),
        filament_weight_grams: weight_grams,
        filament_length_meters: length_meters,
        estimated_cost_usd: weight_grams.map(|w| format::round2(w * FILAMENT_COST_PER_GRAM)),
        warnings,
    }
}

#[cfg(test)]
#[path = "tests/output_tests.rs"]
mod tests;
