//! The set of instruments a scan covers.
//!
//! Either an explicit comma-separated identifier list or whatever the series
//! provider can enumerate.

use crate::domain::error::ScanError;
use crate::ports::series_provider::SeriesProvider;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    pub ids: Vec<String>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in instrument list")]
    EmptyToken,

    #[error("duplicate instrument: {0}")]
    DuplicateCode(String),

    #[error("instrument list is empty")]
    Empty,
}

/// Split, trim and uppercase an identifier list, preserving order.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    if input.trim().is_empty() {
        return Err(UniverseError::Empty);
    }

    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Explicit list when given, provider enumeration otherwise. Enumeration
/// failure is surfaced as [`ScanError::Provider`].
pub fn resolve_universe(
    provider: &dyn SeriesProvider,
    explicit: Option<&str>,
) -> Result<Universe, ScanError> {
    let ids = match explicit {
        Some(list) => parse_codes(list)?,
        None => provider
            .list_instruments()
            .map_err(|e| match e {
                ScanError::Provider { .. } => e,
                other => ScanError::Provider {
                    reason: other.to_string(),
                },
            })?,
    };
    Ok(Universe { ids })
}
