//! Batch scan of a universe: every strategy over every instrument.
//!
//! Instruments are independent, so they run on a rayon pool and per-task
//! results are collected before ranking. Anything that goes wrong for one
//! instrument turns into a [`SkippedInstrument`]; the scan itself cannot fail
//! once the universe is known.

use crate::domain::backtest::simulate;
use crate::domain::error::ScanError;
use crate::domain::position::PositionStatus;
use crate::domain::series::Series;
use crate::domain::strategy::Strategy;
use crate::domain::trend::{TrendSnapshot, DEFAULT_CORRELATION_WINDOW};
use crate::domain::universe::Universe;
use crate::ports::series_provider::SeriesProvider;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

pub use crate::domain::universe::resolve_universe;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Closes used for the trend correlation tie-break.
    pub correlation_window: usize,
    /// Dedicated pool size; `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            correlation_window: DEFAULT_CORRELATION_WINDOW,
            threads: None,
        }
    }
}

/// One strategy's standing on one instrument at the last bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyState {
    pub code: &'static str,
    pub status: PositionStatus,
    pub closed_trades: usize,
    pub unrealized_pnl: Option<f64>,
    pub last_signal_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
    pub instrument_id: String,
    pub last_date: NaiveDate,
    pub last_price: f64,
    pub states: Vec<StrategyState>,
    /// Strategies currently in position.
    pub composite_score: usize,
    pub trend: TrendSnapshot,
}

impl ScanRow {
    pub fn state(&self, code: &str) -> Option<&StrategyState> {
        self.states.iter().find(|s| s.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    Malformed(String),
    InsufficientHistory { bars: usize, minimum: usize },
}

impl SkipReason {
    fn from_error(err: ScanError) -> Self {
        match err {
            ScanError::NotFound { .. } => SkipReason::NotFound,
            ScanError::InsufficientHistory { bars, minimum, .. } => {
                SkipReason::InsufficientHistory { bars, minimum }
            }
            ScanError::MalformedSeries { reason, .. } => SkipReason::Malformed(reason),
            other => SkipReason::Malformed(other.to_string()),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "no data found"),
            SkipReason::Malformed(reason) => write!(f, "malformed: {reason}"),
            SkipReason::InsufficientHistory { bars, minimum } => {
                write!(f, "only {bars} bars, minimum {minimum} required")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInstrument {
    pub id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "succeeded={} failed={}", self.succeeded, self.failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    /// Codes of the scanned strategies, in the order of every row's states.
    pub strategy_codes: Vec<&'static str>,
    /// Ranked best first.
    pub rows: Vec<ScanRow>,
    /// In universe order.
    pub skipped: Vec<SkippedInstrument>,
    pub summary: ScanSummary,
}

/// Bars needed before every requested strategy can evaluate one bar.
pub fn required_history(strategies: &[Strategy]) -> usize {
    strategies
        .iter()
        .map(Strategy::min_history)
        .max()
        .unwrap_or(0)
        .max(1)
}

/// Scan one already-loaded series.
pub fn scan_series(
    series: &Series,
    strategies: &[Strategy],
    options: &ScanOptions,
) -> Result<ScanRow, ScanError> {
    let minimum = required_history(strategies);
    let last = match series.last() {
        Some(last) if series.len() >= minimum => *last,
        _ => {
            return Err(ScanError::InsufficientHistory {
                instrument: series.instrument_id().to_string(),
                bars: series.len(),
                minimum,
            })
        }
    };

    let states: Vec<StrategyState> = strategies
        .iter()
        .map(|strategy| {
            let run = simulate(series, strategy);
            StrategyState {
                code: run.strategy_code,
                status: run.current_status,
                closed_trades: run.trades.len(),
                unrealized_pnl: run.open_trade.map(|t| t.pnl_percent),
                last_signal_date: run.last_signal().map(|s| s.date),
            }
        })
        .collect();

    let composite_score = states
        .iter()
        .filter(|s| s.status == PositionStatus::InPosition)
        .count();

    Ok(ScanRow {
        instrument_id: series.instrument_id().to_string(),
        last_date: last.date,
        last_price: last.close,
        states,
        composite_score,
        trend: TrendSnapshot::at_last_bar(series, options.correlation_window),
    })
}

fn scan_instrument(
    provider: &dyn SeriesProvider,
    id: &str,
    strategies: &[Strategy],
    options: &ScanOptions,
) -> Result<ScanRow, ScanError> {
    let started = Instant::now();
    let series = provider.load(id)?;
    let row = scan_series(&series, strategies, options)?;
    debug!(
        instrument = id,
        bars = series.len(),
        score = row.composite_score,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "instrument scanned"
    );
    Ok(row)
}

pub fn scan(
    provider: &dyn SeriesProvider,
    universe: &Universe,
    strategies: &[Strategy],
    options: &ScanOptions,
) -> ScanReport {
    info!(
        instruments = universe.count(),
        strategies = strategies.len(),
        "starting scan"
    );

    let run_all = || {
        universe
            .ids
            .par_iter()
            .map(|id| (id.clone(), scan_instrument(provider, id, strategies, options)))
            .collect::<Vec<_>>()
    };

    let pool = options.threads.filter(|&n| n > 0).and_then(|n| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| warn!(threads = n, error = %e, "falling back to the global pool"))
            .ok()
    });
    let results = match &pool {
        Some(tp) => tp.install(run_all),
        None => run_all(),
    };

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    for (id, result) in results {
        match result {
            Ok(row) => rows.push(row),
            Err(err) => {
                let reason = SkipReason::from_error(err);
                warn!(instrument = %id, %reason, "skipping instrument");
                skipped.push(SkippedInstrument { id, reason });
            }
        }
    }

    rank(&mut rows);
    let summary = ScanSummary {
        succeeded: rows.len(),
        failed: skipped.len(),
    };
    info!(%summary, "scan finished");

    ScanReport {
        strategy_codes: strategies.iter().map(Strategy::code).collect(),
        rows,
        skipped,
        summary,
    }
}

/// Score descending, then trend correlation descending with undefined
/// last, then instrument id ascending.
pub fn rank(rows: &mut [ScanRow]) {
    rows.sort_by(|a, b| {
        b.composite_score
            .cmp(&a.composite_score)
            .then_with(|| compare_correlation(a.trend.correlation, b.trend.correlation))
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });
}

fn compare_correlation(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
