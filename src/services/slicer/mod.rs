//! Slicer CLI output interpretation, comparison and batch arithmetic.
//!
//! Process management lives behind the [`SliceRunner`] seam; this module
//! only interprets what an invocation left behind (exit code, stdout,
//! stderr, files staged in the output directory).

use std::path::Path;

use crate::types::errors::SliceResult;

pub mod compare;
pub mod format;
pub mod output;
pub mod time_parse;

/// Default filament cost per gram (PLA, ~$30/kg).
pub const FILAMENT_COST_PER_GRAM: f64 = 0.03;

/// Captured result of one finished slicer CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Seam to the external slicer CLI.
///
/// Implementations own binary resolution, process launch, timeout
/// enforcement and output-directory staging, reporting
/// [`crate::types::errors::SliceError::ToolUnavailable`] (before any
/// invocation is attempted) and
/// [`crate::types::errors::SliceError::Timeout`] themselves.
/// The output directory is cleared before each run and must not be shared
/// by two in-flight invocations; callers either serialize runs against one
/// directory or give each concurrent run its own.
pub trait SliceRunner {
    fn run(
        &self,
        file_path: &Path,
        output_dir: &Path,
        profile_override: Option<&Path>,
    ) -> SliceResult<SliceOutcome>;
}
