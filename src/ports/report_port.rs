//! Report output port trait.

use crate::domain::backtest::StrategyRunResult;
use crate::domain::error::ScanError;
use crate::domain::scanner::ScanReport;
use std::path::Path;

pub trait ReportPort {
    /// Ranked scan rows plus skipped instruments.
    fn write_scan(&self, report: &ScanReport, path: &Path) -> Result<(), ScanError>;

    /// Trade ledger of a single strategy run, open trade last.
    fn write_run(&self, run: &StrategyRunResult, path: &Path) -> Result<(), ScanError>;
}
