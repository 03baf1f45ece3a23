use serde::Serialize;
use thiserror::Error;

/// Maximum characters of error detail shown on presentation surfaces.
/// The internal error value always carries the full message.
pub const MAX_ERROR_DISPLAY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum SliceError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Slicer CLI not available: {0}")]
    ToolUnavailable(String),
    #[error("Slicer failed: {0}")]
    ExternalToolFailure(String),
    #[error("Slicer timed out after {0} seconds")]
    Timeout(u64),
    #[error("Comparison data missing: {0}")]
    ComparisonDataMissing(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SliceError {
    /// Display form for UI surfaces. Tool output embedded in a failure can
    /// run to thousands of characters; it is truncated here and only here.
    pub fn display_message(&self) -> String {
        match self {
            SliceError::ExternalToolFailure(msg) => {
                format!(
                    "Slicer failed: {}",
                    crate::services::slicer::format::truncate_message(msg, MAX_ERROR_DISPLAY_CHARS)
                )
            }
            other => other.to_string(),
        }
    }
}

impl Serialize for SliceError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.display_message().as_ref())
    }
}

pub type SliceResult<T> = Result<T, SliceError>;

#[cfg(test)]
#[path = "tests/errors_tests.rs"]
mod tests;
