//! CLI definition and dispatch.
//!
//! Tables go to stdout; progress and warnings go through `tracing` to stderr.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvSeriesAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_checked, StrategyRunResult};
use crate::domain::config_validation::validate_scan_config;
use crate::domain::error::ScanError;
use crate::domain::metrics::RunMetrics;
use crate::domain::position::PositionStatus;
use crate::domain::scanner::{resolve_universe, scan, ScanOptions, ScanReport};
use crate::domain::strategy::Strategy;
use crate::domain::trend::DEFAULT_CORRELATION_WINDOW;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;
use crate::ports::series_provider::SeriesProvider;

#[derive(Parser, Debug)]
#[command(name = "trendscan", about = "Daily signal scanner and strategy backtester")]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the universe and rank instruments
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated instrument ids (overrides [scan] instruments)
        #[arg(long)]
        instruments: Option<String>,
        /// CORE, ALL or comma-separated strategy codes
        #[arg(long)]
        strategies: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Replay one strategy over one instrument
    Inspect {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        instrument: String,
        #[arg(long)]
        strategy: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List instruments available to the provider
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for instrument(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        instrument: Option<String>,
    },
    /// List strategy codes, warm-ups and indicators
    Strategies,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Scan {
            config,
            instruments,
            strategies,
            output,
            threads,
        } => run_scan(
            &config,
            instruments.as_deref(),
            strategies.as_deref(),
            output.as_deref(),
            threads,
        ),
        Command::Inspect {
            config,
            instrument,
            strategy,
            output,
        } => run_inspect(&config, &instrument, &strategy, output.as_deref()),
        Command::List { config } => run_list(&config),
        Command::Info { config, instrument } => run_info(&config, instrument.as_deref()),
        Command::Strategies => {
            print_strategies();
            Ok(())
        }
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ScanError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Scan options from `[scan]`, with an optional thread override.
pub fn build_scan_options(config: &dyn ConfigPort, threads: Option<usize>) -> ScanOptions {
    let window = config.get_int(
        "scan",
        "correlation_window",
        DEFAULT_CORRELATION_WINDOW as i64,
    );
    let threads = threads.unwrap_or_else(|| config.get_int("scan", "threads", 0).max(0) as usize);
    ScanOptions {
        correlation_window: window.max(0) as usize,
        threads: (threads > 0).then_some(threads),
    }
}

fn run_scan(
    config_path: &Path,
    instruments: Option<&str>,
    strategies: Option<&str>,
    output: Option<&Path>,
    threads: Option<usize>,
) -> Result<(), ScanError> {
    let config = load_config(config_path)?;
    validate_scan_config(&config)?;

    let provider = CsvSeriesAdapter::from_config(&config)?;
    let strategy_list = strategies
        .map(str::to_string)
        .unwrap_or_else(|| config.get_list("scan", "strategies", &["CORE"]).join(","));
    let strategies = Strategy::parse_list(&strategy_list, &config)?;

    let explicit = instruments
        .map(str::to_string)
        .or_else(|| non_empty(config.get_string("scan", "instruments")));
    let universe = resolve_universe(&provider, explicit.as_deref())?;
    if universe.is_empty() {
        warn!(dir = %provider.base_path().display(), "universe is empty");
    }
    let options = build_scan_options(&config, threads);

    let report = scan(&provider, &universe, &strategies, &options);
    print_scan_table(&report);

    let output = output
        .map(Path::to_path_buf)
        .or_else(|| non_empty(config.get_string("scan", "output")).map(PathBuf::from));
    if let Some(path) = output {
        CsvReportAdapter.write_scan(&report, &path)?;
        info!(path = %path.display(), "report written");
    }

    println!("{}", report.summary);
    Ok(())
}

fn print_scan_table(report: &ScanReport) {
    let mut header = format!(
        "{:>4}  {:<10} {:<10} {:>10} {:>5} {:>7} {:<9}",
        "#", "INSTRUMENT", "DATE", "CLOSE", "SCORE", "CORR", "RIBBON"
    );
    for code in &report.strategy_codes {
        header.push_str(&format!(" {code:>10}"));
    }
    println!("{header}");

    for (rank, row) in report.rows.iter().enumerate() {
        let corr = row
            .trend
            .correlation
            .map(|c| format!("{c:.3}"))
            .unwrap_or_else(|| "-".to_string());
        let mut line = format!(
            "{:>4}  {:<10} {:<10} {:>10.2} {:>5} {:>7} {:<9}",
            rank + 1,
            row.instrument_id,
            row.last_date,
            row.last_price,
            row.composite_score,
            corr,
            row.trend.ribbon
        );
        for state in &row.states {
            let cell = match state.status {
                PositionStatus::InPosition => "IN",
                PositionStatus::Flat => "-",
            };
            line.push_str(&format!(" {cell:>10}"));
        }
        println!("{line}");
    }

    for skip in &report.skipped {
        println!("skipped {}: {}", skip.id, skip.reason);
    }
}

fn run_inspect(
    config_path: &Path,
    instrument: &str,
    code: &str,
    output: Option<&Path>,
) -> Result<(), ScanError> {
    let config = load_config(config_path)?;
    let provider = CsvSeriesAdapter::from_config(&config)?;
    let strategy = Strategy::from_config(code, &config)?;

    let series = provider.load(&instrument.to_uppercase())?;
    info!(
        instrument = series.instrument_id(),
        bars = series.len(),
        strategy = strategy.code(),
        "replaying"
    );
    let run = run_checked(&series, &strategy)?;
    print_run(series.instrument_id(), &strategy, &run);

    if let Some(path) = output {
        CsvReportAdapter.write_run(&run, path)?;
        info!(path = %path.display(), "ledger written");
    }
    Ok(())
}

fn print_run(instrument: &str, strategy: &Strategy, run: &StrategyRunResult) {
    println!("{instrument}  {strategy}  warm-up {} bars", strategy.warmup());

    println!("\nSignals:");
    for signal in &run.signals {
        println!("  {}  {:<4} {:>10.2}", signal.date, signal.kind, signal.price);
    }

    println!("\nTrades:");
    for trade in run.ledger() {
        let exit = trade
            .exit_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "open".to_string());
        println!(
            "  {} -> {:<10} {:>10.2} -> {:>10.2}  {:>+8.2}%",
            trade.entry_date, exit, trade.entry_price, trade.exit_price, trade.pnl_percent
        );
    }

    let m = RunMetrics::compute(run);
    println!("\nStatus:           {}", run.current_status);
    println!("Total Return:     {:.2}%", m.total_return_pct);
    println!("Max Drawdown:     -{:.1}%", m.max_drawdown * 100.0);
    println!(
        "Closed Trades:    {} ({} won, {} lost, {} even)",
        run.trades.len(),
        m.trades_won,
        m.trades_lost,
        m.trades_breakeven
    );
    println!("Win Rate:         {:.1}%", m.win_rate * 100.0);
    println!("Profit Factor:    {:.2}", m.profit_factor);
    println!("Avg Win / Loss:   {:.2}% / {:.2}%", m.avg_win_pct, m.avg_loss_pct);
    println!(
        "Largest Win/Loss: {:.2}% / {:.2}%",
        m.largest_win_pct, m.largest_loss_pct
    );
    println!("Avg Holding:      {:.1} days", m.avg_holding_days);
    if let Some(pnl) = m.unrealized_pct {
        println!("Unrealized:       {pnl:+.2}%");
    }
}

fn run_list(config_path: &Path) -> Result<(), ScanError> {
    let config = load_config(config_path)?;
    let provider = CsvSeriesAdapter::from_config(&config)?;
    let ids = provider.list_instruments()?;

    if ids.is_empty() {
        warn!(dir = %provider.base_path().display(), "no instruments found");
    }
    for id in &ids {
        println!("{id}");
    }
    info!(count = ids.len(), "instruments listed");
    Ok(())
}

fn run_info(config_path: &Path, instrument: Option<&str>) -> Result<(), ScanError> {
    let config = load_config(config_path)?;
    let provider = CsvSeriesAdapter::from_config(&config)?;
    let ids = match instrument {
        Some(id) => vec![id.to_uppercase()],
        None => provider.list_instruments()?,
    };

    for id in &ids {
        match provider.data_range(id) {
            Ok(Some((first, last, bars))) => println!("{id}: {bars} bars, {first} to {last}"),
            Ok(None) => println!("{id}: no data found"),
            Err(e) => warn!(instrument = %id, error = %e, "cannot read series"),
        }
    }
    Ok(())
}

fn print_strategies() {
    println!("{:<11} {:<27} {:>7}  INDICATORS", "CODE", "NAME", "WARMUP");
    for strategy in Strategy::all() {
        let indicators: Vec<String> = strategy
            .indicators()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "{:<11} {:<27} {:>7}  {}",
            strategy.code(),
            strategy.name(),
            strategy.warmup(),
            indicators.join(", ")
        );
    }
}

fn run_validate(config_path: &Path) -> Result<(), ScanError> {
    let config = load_config(config_path)?;
    validate_scan_config(&config)?;

    let list = config.get_list("scan", "strategies", &["CORE"]).join(",");
    let strategies = Strategy::parse_list(&list, &config)?;
    println!("Strategies:");
    for strategy in &strategies {
        println!("  {strategy}  warm-up {}", strategy.warmup());
    }
    println!("Configuration is valid.");
    Ok(())
}
