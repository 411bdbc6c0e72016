//! CSV report writer.

use crate::domain::backtest::StrategyRunResult;
use crate::domain::error::ScanError;
use crate::domain::metrics::RunMetrics;
use crate::domain::scanner::ScanReport;
use crate::domain::trend::{TrendSnapshot, PEARSON_WINDOWS};
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct CsvReportAdapter;

fn report_err(path: &Path, e: impl std::fmt::Display) -> ScanError {
    ScanError::Report {
        reason: format!("{}: {e}", path.display()),
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write_scan(&self, report: &ScanReport, path: &Path) -> Result<(), ScanError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| report_err(path, e))?;

        let mut header: Vec<String> = [
            "rank",
            "instrument",
            "last_date",
            "last_price",
            "score",
            "correlation",
            "ribbon",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        header.extend(report.strategy_codes.iter().map(|c| c.to_string()));
        header.extend(trend_header());
        header.push("skip_reason".to_string());
        wtr.write_record(&header).map_err(|e| report_err(path, e))?;

        for (rank, row) in report.rows.iter().enumerate() {
            let mut record = vec![
                (rank + 1).to_string(),
                row.instrument_id.clone(),
                row.last_date.to_string(),
                format!("{:.4}", row.last_price),
                row.composite_score.to_string(),
                fmt_opt(row.trend.correlation, 4),
                row.trend.ribbon.to_string(),
            ];
            record.extend(
                report
                    .strategy_codes
                    .iter()
                    .map(|code| row.state(code).map(|s| s.status.to_string()).unwrap_or_default()),
            );
            record.extend(trend_cells(&row.trend));
            record.push(String::new());
            wtr.write_record(&record).map_err(|e| report_err(path, e))?;
        }

        let blanks = 5 + report.strategy_codes.len() + trend_header().len();
        for skip in &report.skipped {
            let mut record = vec![String::new(), skip.id.clone()];
            record.extend(std::iter::repeat_n(String::new(), blanks));
            record.push(skip.reason.to_string());
            wtr.write_record(&record).map_err(|e| report_err(path, e))?;
        }

        wtr.flush().map_err(|e| report_err(path, e))?;
        Ok(())
    }

    /// Trade ledger, then a `metric,value` block summarizing the run.
    fn write_run(&self, run: &StrategyRunResult, path: &Path) -> Result<(), ScanError> {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| report_err(path, e))?;
        wtr.write_record([
            "strategy",
            "entry_date",
            "entry_price",
            "exit_date",
            "exit_price",
            "pnl_pct",
            "holding_days",
            "state",
        ])
        .map_err(|e| report_err(path, e))?;

        for trade in run.ledger() {
            let days = run
                .as_of
                .map(|as_of| trade.holding_days(as_of).to_string())
                .unwrap_or_default();
            wtr.write_record([
                run.strategy_code.to_string(),
                trade.entry_date.to_string(),
                format!("{:.4}", trade.entry_price),
                trade.exit_date.map(|d| d.to_string()).unwrap_or_default(),
                format!("{:.4}", trade.exit_price),
                format!("{:.2}", trade.pnl_percent),
                days,
                if trade.is_open() { "OPEN" } else { "CLOSED" }.to_string(),
            ])
            .map_err(|e| report_err(path, e))?;
        }

        for record in metric_rows(&RunMetrics::compute(run), run.trades.len()) {
            wtr.write_record(&record).map_err(|e| report_err(path, e))?;
        }

        wtr.flush().map_err(|e| report_err(path, e))?;
        Ok(())
    }
}

/// Columns after the strategy states: multi-window Pearson, the regression
/// channel and the volume surge flag.
fn trend_header() -> Vec<String> {
    let mut header: Vec<String> = PEARSON_WINDOWS
        .iter()
        .map(|w| format!("pearson_{w}"))
        .collect();
    header.extend(
        [
            "channel_upper",
            "channel_lower",
            "upper_dist_pct",
            "lower_dist_pct",
            "volume_surge",
        ]
        .map(String::from),
    );
    header
}

fn trend_cells(trend: &TrendSnapshot) -> Vec<String> {
    let mut cells: Vec<String> = trend.pearson.iter().map(|r| fmt_opt(*r, 4)).collect();
    let channel = trend.channel;
    cells.push(fmt_opt(channel.map(|c| c.upper), 4));
    cells.push(fmt_opt(channel.map(|c| c.lower), 4));
    cells.push(fmt_opt(channel.map(|c| c.upper_distance_pct), 2));
    cells.push(fmt_opt(channel.map(|c| c.lower_distance_pct), 2));
    cells.push(match trend.volume_surge {
        Some(true) => "YES".to_string(),
        Some(false) => "NO".to_string(),
        None => String::new(),
    });
    cells
}

fn metric_rows(m: &RunMetrics, closed: usize) -> Vec<[String; 2]> {
    let pct = |v: f64| format!("{v:.2}");
    let rows = [
        ("total_return_pct", pct(m.total_return_pct)),
        ("max_drawdown_pct", pct(m.max_drawdown * 100.0)),
        ("closed_trades", closed.to_string()),
        ("trades_won", m.trades_won.to_string()),
        ("trades_lost", m.trades_lost.to_string()),
        ("trades_breakeven", m.trades_breakeven.to_string()),
        ("win_rate_pct", pct(m.win_rate * 100.0)),
        ("profit_factor", format!("{:.4}", m.profit_factor)),
        ("avg_win_pct", pct(m.avg_win_pct)),
        ("avg_loss_pct", pct(m.avg_loss_pct)),
        ("largest_win_pct", pct(m.largest_win_pct)),
        ("largest_loss_pct", pct(m.largest_loss_pct)),
        ("avg_holding_days", format!("{:.1}", m.avg_holding_days)),
        ("unrealized_pct", m.unrealized_pct.map(pct).unwrap_or_default()),
    ];
    std::iter::once(["metric".to_string(), "value".to_string()])
        .chain(rows.into_iter().map(|(name, value)| [name.to_string(), value]))
        .collect()
}
