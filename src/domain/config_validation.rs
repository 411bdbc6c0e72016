//! Configuration validation.
//!
//! Checks every field a scan reads before any series is loaded.

use crate::domain::error::ScanError;
use crate::domain::strategy::Strategy;
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;

pub const MIN_CORRELATION_WINDOW: i64 = 3;

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    validate_data_dir(config)?;
    validate_correlation_window(config)?;
    validate_threads(config)?;
    validate_instruments(config)?;
    validate_strategies(config)?;
    Ok(())
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(ScanError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        }),
    }
}

fn validate_correlation_window(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let value = config.get_int("scan", "correlation_window", 55);
    if value < MIN_CORRELATION_WINDOW {
        return Err(ScanError::ConfigInvalid {
            section: "scan".to_string(),
            key: "correlation_window".to_string(),
            reason: format!("correlation_window must be at least {MIN_CORRELATION_WINDOW}"),
        });
    }
    Ok(())
}

fn validate_threads(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let value = config.get_int("scan", "threads", 0);
    if value < 0 {
        return Err(ScanError::ConfigInvalid {
            section: "scan".to_string(),
            key: "threads".to_string(),
            reason: "threads must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_instruments(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string("scan", "instruments") {
        Some(s) if !s.trim().is_empty() => {
            parse_codes(&s)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Strategy codes parse and every `[strategy.*]` override is in range.
fn validate_strategies(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let list = config.get_list("scan", "strategies", &["CORE"]).join(",");
    Strategy::parse_list(&list, config)?;
    Strategy::parse_list("ALL", config)?;
    Ok(())
}
