//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for trendscan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("series provider failure: {reason}")]
    Provider { reason: String },

    #[error("no series found for {instrument}")]
    NotFound { instrument: String },

    #[error("malformed series {instrument}: {reason}")]
    MalformedSeries { instrument: String, reason: String },

    #[error("insufficient history for {instrument}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        instrument: String,
        bars: usize,
        minimum: usize,
    },

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("report error: {reason}")]
    Report { reason: String },
}

impl ScanError {
    pub fn malformed(instrument: &str, reason: impl Into<String>) -> Self {
        ScanError::MalformedSeries {
            instrument: instrument.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ScanError> for std::process::ExitCode {
    fn from(err: &ScanError) -> Self {
        let code: u8 = match err {
            ScanError::Report { .. } => 1,
            ScanError::ConfigParse { .. }
            | ScanError::ConfigMissing { .. }
            | ScanError::ConfigInvalid { .. }
            | ScanError::UnknownStrategy(_)
            | ScanError::Universe(_) => 2,
            ScanError::Provider { .. } => 3,
            ScanError::NotFound { .. }
            | ScanError::MalformedSeries { .. }
            | ScanError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
