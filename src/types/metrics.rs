//! Canonical records produced by the extraction pipeline.
//!
//! Every strategy converges on these fixed-shape records. Optional fields
//! are `None` only when the source key was absent or unparsable; an
//! explicit false or zero from the source stays distinguishable from
//! absence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::errors::SliceError;

/// Print settings read from a 3MF project archive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrintMetadata {
    pub filament_type: Option<String>,
    /// Unit-suffixed, e.g. "0.4mm".
    pub nozzle_diameter: Option<String>,
    /// Unit-suffixed, e.g. "0.2mm".
    pub layer_height: Option<String>,
    /// Percentage-suffixed, e.g. "15%". "0%" is a real value, not absence.
    pub infill_density: Option<String>,
    pub wall_loops: Option<u32>,
    /// `Some(false)` means the key was present with a non-true value;
    /// `None` means the key was absent entirely.
    pub support_enabled: Option<bool>,
    pub previously_sliced: bool,
    /// Formatted duration from a previous slice, e.g. "1h 15m".
    pub last_estimate: Option<String>,
}

/// Metrics derived from one slicer invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceMetrics {
    pub estimated_time_minutes: Option<f64>,
    pub estimated_time_formatted: Option<String>,
    pub filament_weight_grams: Option<f64>,
    pub filament_length_meters: Option<f64>,
    /// Rounded to two decimals when the record is built; intermediate
    /// arithmetic upstream is unrounded.
    pub estimated_cost_usd: Option<f64>,
    /// At most five entries, in original output order.
    pub warnings: Vec<String>,
}

/// The profiles a comparison or batch request can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Current,
    Fast,
    Balanced,
    Strong,
}

impl Profile {
    /// Preset order. Ties in fastest-preset selection break toward the
    /// earliest entry here.
    pub const PRESETS: [Profile; 3] = [Profile::Fast, Profile::Balanced, Profile::Strong];

    pub fn name(&self) -> &'static str {
        match self {
            Profile::Current => "current",
            Profile::Fast => "fast",
            Profile::Balanced => "balanced",
            Profile::Strong => "strong",
        }
    }

    /// Capitalized form for user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Profile::Current => "Current",
            Profile::Fast => "Fast",
            Profile::Balanced => "Balanced",
            Profile::Strong => "Strong",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Profile::Current),
            "fast" => Ok(Profile::Fast),
            "balanced" => Ok(Profile::Balanced),
            "strong" => Ok(Profile::Strong),
            other => Err(SliceError::InvalidRequest(format!(
                "Invalid profile name: {other}. Must be one of: current, fast, balanced, strong"
            ))),
        }
    }
}

/// Either the metrics for one profile or a description of why slicing it
/// failed. Serializes as the metrics object or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileOutcome {
    Metrics(SliceMetrics),
    Failed { error: String },
}

/// One profile's result within a comparison. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileResult {
    pub profile: Profile,
    #[serde(flatten)]
    pub outcome: ProfileOutcome,
}

impl ProfileResult {
    pub fn ok(profile: Profile, metrics: SliceMetrics) -> Self {
        Self {
            profile,
            outcome: ProfileOutcome::Metrics(metrics),
        }
    }

    pub fn failed(profile: Profile, error: impl Into<String>) -> Self {
        Self {
            profile,
            outcome: ProfileOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn metrics(&self) -> Option<&SliceMetrics> {
        match &self.outcome {
            ProfileOutcome::Metrics(m) => Some(m),
            ProfileOutcome::Failed { .. } => None,
        }
    }

    pub fn time_minutes(&self) -> Option<f64> {
        self.metrics().and_then(|m| m.estimated_time_minutes)
    }
}

/// Comparison of current settings against the three presets. Created only
/// once all four results are known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub current: ProfileResult,
    pub fast: ProfileResult,
    pub balanced: ProfileResult,
    pub strong: ProfileResult,
    pub recommendation: String,
}

/// Linear scaling of one profile's per-unit metrics to a production run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub quantity: i64,
    pub profile: Profile,
    pub total_time_hours: f64,
    pub total_time_formatted: String,
    pub total_filament_kg: Option<f64>,
    pub total_cost_usd: Option<f64>,
    pub per_unit_time: String,
    pub comparison_vs_current: String,
}

#[cfg(test)]
#[path = "tests/metrics_tests.rs"]
mod tests;
