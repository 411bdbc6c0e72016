//! Summary statistics for a single strategy run.

use crate::domain::backtest::{StrategyRunResult, INITIAL_EQUITY};

#[derive(Debug, Clone, PartialEq)]
pub struct RunMetrics {
    /// Percent gain of the closed-trade equity curve over its start.
    pub total_return_pct: f64,
    /// Largest peak-to-trough decline of the equity curve, as a fraction.
    pub max_drawdown: f64,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub largest_win_pct: f64,
    pub largest_loss_pct: f64,
    pub avg_holding_days: f64,
    pub unrealized_pct: Option<f64>,
}

impl RunMetrics {
    pub fn compute(run: &StrategyRunResult) -> Self {
        let total_return_pct = run.final_equity() - INITIAL_EQUITY;
        let max_drawdown = compute_drawdown(&run.equity);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_days = 0i64;

        for trade in &run.trades {
            let pnl = trade.pnl_percent;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }
            if let Some(exit) = trade.exit_date {
                total_days += (exit - trade.entry_date).num_days();
            }
        }

        let total_trades = run.trades.len();
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win_pct = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss_pct = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let avg_holding_days = if total_trades > 0 {
            total_days as f64 / total_trades as f64
        } else {
            0.0
        };

        RunMetrics {
            total_return_pct,
            max_drawdown,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win_pct,
            avg_loss_pct,
            largest_win_pct: largest_win,
            largest_loss_pct: largest_loss,
            avg_holding_days,
            unrealized_pct: run.open_trade.map(|t| t.pnl_percent),
        }
    }
}

fn compute_drawdown(equity: &[f64]) -> f64 {
    let Some(&first) = equity.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &value in equity {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - value) / peak);
        }
    }
    max_dd
}
