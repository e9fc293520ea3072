//! Error taxonomy shared by the alignment, detection, and correlation stages.

use thiserror::Error;

/// Errors raised by the analysis core.
///
/// All variants are deterministic consequences of the inputs; none of them
/// is worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Malformed or out-of-range input (observation outside the calendar,
    /// duplicate date, mismatched sequence lengths, bad parameter).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Too few points to difference or correlate.
    #[error("insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A threshold could not be derived because the series carries no signal.
    #[error("degenerate series: {0}")]
    DegenerateSeries(String),

    /// Query against a region or instrument that was never loaded.
    #[error("{kind} '{code}' is not loaded")]
    NotFound { kind: &'static str, code: String },

    /// Store construction violated one of its invariants.
    #[error("load error: {0}")]
    LoadError(String),
}

impl AnalysisError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Convenience constructor for an unknown region.
    #[must_use]
    pub fn region_not_found(code: &str) -> Self {
        Self::NotFound {
            kind: "region",
            code: code.to_string(),
        }
    }

    /// Convenience constructor for an unknown instrument.
    #[must_use]
    pub fn instrument_not_found(code: &str) -> Self {
        Self::NotFound {
            kind: "instrument",
            code: code.to_string(),
        }
    }
}

/// Result alias for the analysis core.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_code() {
        let err = AnalysisError::region_not_found("usa");
        assert_eq!(err.to_string(), "region 'usa' is not loaded");

        let err = AnalysisError::instrument_not_found("tx60");
        assert_eq!(err.to_string(), "instrument 'tx60' is not loaded");
    }

    #[test]
    fn insufficient_data_message_reports_counts() {
        let err = AnalysisError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 2 points, got 1"
        );
    }
}
