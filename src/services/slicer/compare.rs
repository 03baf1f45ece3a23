//! Profile comparison and batch-production arithmetic.
//!
//! Drives the [`SliceRunner`] seam once per profile, interprets each
//! invocation and reduces the results to a recommendation or a batch
//! report. A preset that fails to slice becomes a failure entry in the
//! report; only the current-settings run is load-bearing.

use std::path::{Path, PathBuf};

use crate::logging::DiagnosticSink;
use crate::services::slicer::output::OutputInterpreter;
use crate::services::slicer::{format, SliceRunner};
use crate::types::errors::{SliceError, SliceResult};
use crate::types::metrics::{
    BatchReport, ComparisonReport, Profile, ProfileResult, SliceMetrics,
};

/// Minutes of savings beyond which switching presets is worth a
/// recommendation; within +/- this band print times count as similar.
const RECOMMEND_THRESHOLD_MINUTES: f64 = 30.0;

const INSUFFICIENT_DATA_MESSAGE: &str =
    "Unable to generate recommendation: missing time estimates";

/// Filesystem locations of the preset override files. Loading and
/// validating their contents is the runner's concern; only existence is
/// checked here so a missing preset degrades to a per-profile failure.
#[derive(Debug, Clone)]
pub struct ProfileOverrides {
    pub fast: PathBuf,
    pub balanced: PathBuf,
    pub strong: PathBuf,
}

impl ProfileOverrides {
    fn path_for(&self, profile: Profile) -> Option<&Path> {
        match profile {
            Profile::Current => None,
            Profile::Fast => Some(&self.fast),
            Profile::Balanced => Some(&self.balanced),
            Profile::Strong => Some(&self.strong),
        }
    }
}

pub struct ComparisonEngine<'a> {
    runner: &'a dyn SliceRunner,
    interpreter: OutputInterpreter<'a>,
}

impl<'a> ComparisonEngine<'a> {
    pub fn new(runner: &'a dyn SliceRunner, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            runner,
            interpreter: OutputInterpreter::new(sink),
        }
    }

    /// Slice with current settings and every preset, then recommend.
    ///
    /// A preset failure (missing override file, tool failure, timeout)
    /// becomes a failure entry; a current-settings failure aborts the
    /// whole comparison.
    pub fn compare(
        &self,
        file_path: &Path,
        output_root: &Path,
        overrides: &ProfileOverrides,
    ) -> SliceResult<ComparisonReport> {
        let current = ProfileResult::ok(
            Profile::Current,
            self.slice_profile(file_path, output_root, Profile::Current, None)?,
        );

        let fast = self.preset_result(file_path, output_root, Profile::Fast, overrides);
        let balanced = self.preset_result(file_path, output_root, Profile::Balanced, overrides);
        let strong = self.preset_result(file_path, output_root, Profile::Strong, overrides);

        let recommendation = recommendation(&current, &fast, &balanced, &strong);

        Ok(ComparisonReport {
            current,
            fast,
            balanced,
            strong,
            recommendation,
        })
    }

    /// Scale one profile's per-unit metrics to `quantity` units.
    pub fn batch(
        &self,
        file_path: &Path,
        output_root: &Path,
        quantity: i64,
        profile: Profile,
        overrides: &ProfileOverrides,
    ) -> SliceResult<BatchReport> {
        if quantity <= 0 {
            return Err(SliceError::InvalidRequest(format!(
                "Quantity must be positive, got {quantity}"
            )));
        }

        let baseline = self.slice_profile(file_path, output_root, Profile::Current, None)?;

        let chosen = if profile == Profile::Current {
            baseline.clone()
        } else {
            self.slice_profile(file_path, output_root, profile, overrides.path_for(profile))?
        };

        let time_per_unit = chosen.estimated_time_minutes.ok_or_else(|| {
            SliceError::ComparisonDataMissing("Could not determine time per unit".to_string())
        })?;

        let units = quantity as f64;
        let total_minutes = time_per_unit * units;

        let comparison_vs_current = match baseline.estimated_time_minutes {
            Some(baseline_time) if profile != Profile::Current => {
                let delta_minutes = (time_per_unit - baseline_time) * units;
                format!("{} vs. current settings", format::format_delta(delta_minutes))
            }
            _ => "baseline".to_string(),
        };

        Ok(BatchReport {
            quantity,
            profile,
            total_time_hours: format::round1(total_minutes / 60.0),
            total_time_formatted: format::format_batch_duration(total_minutes),
            total_filament_kg: chosen
                .filament_weight_grams
                .map(|w| format::round2(w * units / 1000.0)),
            total_cost_usd: chosen
                .estimated_cost_usd
                .map(|c| format::round2(c * units)),
            per_unit_time: format::format_duration(time_per_unit),
            comparison_vs_current,
        })
    }

    fn preset_result(
        &self,
        file_path: &Path,
        output_root: &Path,
        profile: Profile,
        overrides: &ProfileOverrides,
    ) -> ProfileResult {
        match self.slice_profile(file_path, output_root, profile, overrides.path_for(profile)) {
            Ok(metrics) => ProfileResult::ok(profile, metrics),
            Err(e) => ProfileResult::failed(profile, e.display_message()),
        }
    }

    fn slice_profile(
        &self,
        file_path: &Path,
        output_root: &Path,
        profile: Profile,
        override_path: Option<&Path>,
    ) -> SliceResult<SliceMetrics> {
        if let Some(path) = override_path {
            if !path.exists() {
                return Err(SliceError::NotFound(format!(
                    "Profile file not found: {}",
                    path.display()
                )));
            }
        }

        let output_dir = output_root.join(profile.name());
        let outcome = self.runner.run(file_path, &output_dir, override_path)?;
        self.interpreter.interpret_outcome(&outcome, &output_dir)
    }
}

/// Reduce the four profile results to a recommendation string.
///
/// Requires a known time estimate on all four results; otherwise a fixed
/// insufficient-data message is returned and the arithmetic is skipped.
pub fn recommendation(
    current: &ProfileResult,
    fast: &ProfileResult,
    balanced: &ProfileResult,
    strong: &ProfileResult,
) -> String {
    let (Some(current_time), Some(fast_time), Some(balanced_time), Some(strong_time)) = (
        current.time_minutes(),
        fast.time_minutes(),
        balanced.time_minutes(),
        strong.time_minutes(),
    ) else {
        return INSUFFICIENT_DATA_MESSAGE.to_string();
    };

    // Strict less-than keeps the earliest preset on an exact tie.
    let presets = [
        (Profile::Fast, fast_time),
        (Profile::Balanced, balanced_time),
        (Profile::Strong, strong_time),
    ];
    let (fastest, fastest_time) = presets
        .into_iter()
        .reduce(|best, candidate| if candidate.1 < best.1 { candidate } else { best })
        .unwrap_or((Profile::Fast, fast_time));

    let savings = current_time - fastest_time;

    if savings > RECOMMEND_THRESHOLD_MINUTES {
        format!(
            "Recommendation: Use {} profile. You'll save {} per unit compared to current \
             settings. This is optimal for minimizing print time.",
            fastest.label(),
            format::format_delta(savings)
        )
    } else if savings < -RECOMMEND_THRESHOLD_MINUTES {
        format!(
            "Current settings are already well-optimized. {} profile saves only {} per unit.",
            fastest.label(),
            format::format_delta(savings)
        )
    } else {
        format!(
            "All profiles have similar print times. {} profile saves {} per unit. Consider \
             your quality requirements when choosing.",
            fastest.label(),
            format::format_delta(savings)
        )
    }
}

#[cfg(test)]
#[path = "tests/compare_tests.rs"]
mod tests;
