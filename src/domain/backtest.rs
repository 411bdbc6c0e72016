//! Bar-by-bar replay of one strategy over one series.
//!
//! The replay holds at most one long unit. A buy while holding and a sell
//! while flat are ignored. Each realized exit compounds the equity curve,
//! which starts at [`INITIAL_EQUITY`]; a position still open at the last bar
//! is reported as an unrealized trade and never touches the curve.

use crate::domain::error::ScanError;
use crate::domain::position::{Position, PositionStatus, Signal, SignalKind, Trade};
use crate::domain::series::Series;
use crate::domain::strategy::{BarAction, Strategy};
use chrono::NaiveDate;

pub const INITIAL_EQUITY: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRunResult {
    pub strategy_code: &'static str,
    pub strategy_name: &'static str,
    pub signals: Vec<Signal>,
    /// Closed trades only.
    pub trades: Vec<Trade>,
    /// Position still held at the last bar, marked at the final close.
    pub open_trade: Option<Trade>,
    pub equity: Vec<f64>,
    pub current_status: PositionStatus,
    /// Date of the last bar, if any.
    pub as_of: Option<NaiveDate>,
}

impl StrategyRunResult {
    pub fn final_equity(&self) -> f64 {
        self.equity.last().copied().unwrap_or(INITIAL_EQUITY)
    }

    /// Closed trades followed by the open one, if any.
    pub fn ledger(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().chain(self.open_trade.iter())
    }

    pub fn last_signal(&self) -> Option<&Signal> {
        self.signals.last()
    }
}

/// Replay `strategy` over `series`. Series shorter than the strategy's
/// minimum history simply produce no signals.
pub fn simulate(series: &Series, strategy: &Strategy) -> StrategyRunResult {
    let actions = strategy.classify(series);
    let bars = series.bars();

    let mut signals = Vec::new();
    let mut trades = Vec::new();
    let mut equity = vec![INITIAL_EQUITY];
    let mut position: Option<Position> = None;

    for (i, action) in actions.iter().enumerate().skip(strategy.warmup()) {
        let bar = &bars[i];
        match (action, position) {
            (BarAction::Buy, None) => {
                let signal = Signal {
                    index: i,
                    date: bar.date,
                    kind: SignalKind::Buy,
                    price: bar.close,
                };
                position = Some(Position::open(&signal));
                signals.push(signal);
            }
            (BarAction::Sell, Some(open)) => {
                let trade = open.close(bar.date, bar.close);
                let last = equity.last().copied().unwrap_or(INITIAL_EQUITY);
                equity.push(last * (1.0 + trade.pnl_percent / 100.0));
                trades.push(trade);
                signals.push(Signal {
                    index: i,
                    date: bar.date,
                    kind: SignalKind::Sell,
                    price: bar.close,
                });
                position = None;
            }
            _ => {}
        }
    }

    let open_trade = match (position, bars.last()) {
        (Some(open), Some(last)) => Some(open.mark(last.close)),
        _ => None,
    };
    let current_status = if open_trade.is_some() {
        PositionStatus::InPosition
    } else {
        PositionStatus::Flat
    };

    StrategyRunResult {
        strategy_code: strategy.code(),
        strategy_name: strategy.name(),
        signals,
        trades,
        open_trade,
        equity,
        current_status,
        as_of: bars.last().map(|b| b.date),
    }
}

/// [`simulate`], but refuse series too short to evaluate a single bar.
pub fn run_checked(series: &Series, strategy: &Strategy) -> Result<StrategyRunResult, ScanError> {
    let minimum = strategy.min_history();
    if series.len() < minimum {
        return Err(ScanError::InsufficientHistory {
            instrument: series.instrument_id().to_string(),
            bars: series.len(),
            minimum,
        });
    }
    Ok(simulate(series, strategy))
}
