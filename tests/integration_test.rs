//! End-to-end scans through the series provider port.
//!
//! Tests cover:
//! - Flat and rising universes through the batch scanner
//! - The V-shaped TEMA-cross trade
//! - Scan rows agreeing with a direct replay of each strategy
//! - Per-instrument skips and the one fatal enumeration failure
//! - Ranking stability under universe permutation and pool size

mod common;

use approx::assert_relative_eq;
use common::*;
use trendscan::domain::backtest::{run_checked, simulate, INITIAL_EQUITY};
use trendscan::domain::error::ScanError;
use trendscan::domain::metrics::RunMetrics;
use trendscan::domain::position::{PositionStatus, SignalKind};
use trendscan::domain::scanner::{
    resolve_universe, scan, scan_series, ScanOptions, SkipReason,
};
use trendscan::domain::strategy::Strategy;
use trendscan::domain::universe::{Universe, UniverseError};

fn universe(ids: &[&str]) -> Universe {
    Universe {
        ids: ids.iter().map(|s| s.to_string()).collect(),
    }
}

mod reference_series {
    use super::*;

    #[test]
    fn flat_universe_scores_zero() {
        let provider = MockSeriesProvider::new().with_series(make_series("FLAT", &flat_closes(300)));
        let report = scan(
            &provider,
            &universe(&["FLAT"]),
            &Strategy::all(),
            &ScanOptions::default(),
        );

        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.failed, 0);
        let row = &report.rows[0];
        assert_eq!(row.composite_score, 0);
        assert!(row.states.iter().all(|s| s.status == PositionStatus::Flat));
        assert!(row.states.iter().all(|s| s.last_signal_date.is_none()));
    }

    #[test]
    fn rising_series_holds_frm_and_hull144() {
        let series = make_series("UP", &rising_closes(300));
        for code in ["FRM", "HULL144"] {
            let strategy = Strategy::from_code(code).unwrap();
            let run = simulate(&series, &strategy);

            let buy = run.signals.first().unwrap();
            assert_eq!(buy.kind, SignalKind::Buy);
            assert!(buy.index < strategy.warmup() + 10, "{code}");
            assert!(run.signals.iter().all(|s| s.kind == SignalKind::Buy), "{code}");
            assert_eq!(run.current_status, PositionStatus::InPosition);
            assert!(run.open_trade.unwrap().pnl_percent > 0.0);
            assert_eq!(run.equity, vec![INITIAL_EQUITY]);
        }
    }

    #[test]
    fn v_shape_tema_cross_closes_one_winner() {
        let series = make_series("V", &v_closes());
        let run = run_checked(&series, &Strategy::from_code("BUM").unwrap()).unwrap();

        assert_eq!(run.trades.len(), 1);
        let trade = run.trades[0];
        assert!(trade.entry_index >= 69);
        assert!(trade.pnl_percent > 0.0);
        assert_relative_eq!(
            run.final_equity(),
            INITIAL_EQUITY * (1.0 + trade.pnl_percent / 100.0),
            epsilon = 1e-9
        );

        let metrics = RunMetrics::compute(&run);
        assert_eq!(metrics.trades_won, 1);
        assert_relative_eq!(metrics.total_return_pct, trade.pnl_percent, epsilon = 1e-9);
        assert_relative_eq!(metrics.max_drawdown, 0.0);
    }

    #[test]
    fn long_v_tema_cross_enters_on_the_decline() {
        // Seeded TEMA(34) crosses above TEMA(68) while both settle onto the
        // falling line, so the single round trip opens before the trough.
        let closes = long_v_closes();
        let series = make_series("V150", &closes);
        let run = run_checked(&series, &Strategy::from_code("BUM").unwrap()).unwrap();

        assert_eq!(run.trades.len(), 1);
        assert!(run.open_trade.is_none());
        let trade = run.trades[0];
        assert!(trade.entry_index < 149, "entry at {}", trade.entry_index);
        assert!(trade.exit_date.unwrap() > series.bars()[149].date);
        assert!(trade.pnl_percent > 0.0);

        let kinds: Vec<SignalKind> = run.signals.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SignalKind::Buy, SignalKind::Sell]);
    }

    #[test]
    fn short_history_is_refused_by_run_checked() {
        let series = make_series("SHORT", &rising_closes(50));
        let err = run_checked(&series, &Strategy::from_code("HULL144").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::InsufficientHistory {
                bars: 50,
                minimum: 156,
                ..
            }
        ));
    }
}

mod round_trip {
    use super::*;

    #[test]
    fn scan_row_matches_direct_replay() {
        let series = make_series("SWING", &swing_closes(400));
        let strategies = Strategy::all();
        let provider = MockSeriesProvider::new().with_series(series.clone());

        let report = scan(
            &provider,
            &universe(&["SWING"]),
            &strategies,
            &ScanOptions::default(),
        );
        let row = &report.rows[0];

        for strategy in &strategies {
            let run = simulate(&series, strategy);
            let state = row.state(strategy.code()).unwrap();
            assert_eq!(state.status, run.current_status, "{strategy}");
            assert_eq!(state.closed_trades, run.trades.len(), "{strategy}");
            assert_eq!(
                state.unrealized_pnl,
                run.open_trade.map(|t| t.pnl_percent),
                "{strategy}"
            );
            assert_eq!(
                state.last_signal_date,
                run.signals.last().map(|s| s.date),
                "{strategy}"
            );
        }

        let direct = scan_series(&series, &strategies, &ScanOptions::default()).unwrap();
        assert_eq!(&direct, row);
    }

    #[test]
    fn swing_series_trades_and_compounds() {
        let series = make_series("SWING", &swing_closes(400));
        let mut traded = 0;
        for strategy in Strategy::all() {
            let run = simulate(&series, &strategy);
            assert_eq!(run.equity.len(), run.trades.len() + 1);
            let compounded = run
                .trades
                .iter()
                .fold(INITIAL_EQUITY, |eq, t| eq * (1.0 + t.pnl_percent / 100.0));
            assert_relative_eq!(run.final_equity(), compounded, epsilon = 1e-9);
            if !run.trades.is_empty() {
                traded += 1;
            }
        }
        assert!(traded >= 3, "only {traded} strategies traded");
    }
}

mod skips {
    use super::*;

    #[test]
    fn failing_instruments_are_skipped_not_fatal() {
        let provider = MockSeriesProvider::new()
            .with_series(make_series("GOOD", &rising_closes(300)))
            .with_series(make_series("SHORT", &rising_closes(40)))
            .with_error("GONE", MockFailure::NotFound)
            .with_error("JUNK", MockFailure::Malformed("bad close".into()));

        let report = scan(
            &provider,
            &universe(&["GOOD", "SHORT", "GONE", "JUNK"]),
            &Strategy::core(),
            &ScanOptions::default(),
        );

        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.failed, 3);
        assert_eq!(report.rows[0].instrument_id, "GOOD");

        let reasons: Vec<(&str, &SkipReason)> = report
            .skipped
            .iter()
            .map(|s| (s.id.as_str(), &s.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (
                    "SHORT",
                    &SkipReason::InsufficientHistory {
                        bars: 40,
                        minimum: 156
                    }
                ),
                ("GONE", &SkipReason::NotFound),
                ("JUNK", &SkipReason::Malformed("bad close".into())),
            ]
        );
    }

    #[test]
    fn all_failed_still_reports() {
        let provider = MockSeriesProvider::new().with_error("GONE", MockFailure::NotFound);
        let report = scan(
            &provider,
            &universe(&["GONE"]),
            &Strategy::core(),
            &ScanOptions::default(),
        );
        assert!(report.rows.is_empty());
        assert_eq!(report.summary.to_string(), "succeeded=0 failed=1");
    }

    #[test]
    fn enumeration_failure_is_fatal() {
        let provider = MockSeriesProvider::new()
            .with_series(make_series("GOOD", &rising_closes(300)))
            .with_listing_error("directory unreadable");
        let err = resolve_universe(&provider, None).unwrap_err();
        assert!(matches!(err, ScanError::Provider { reason } if reason == "directory unreadable"));
    }

    #[test]
    fn explicit_universe_bypasses_enumeration() {
        let provider = MockSeriesProvider::new().with_listing_error("directory unreadable");
        let universe = resolve_universe(&provider, Some("thyao, asels")).unwrap();
        assert_eq!(universe.ids, vec!["THYAO", "ASELS"]);

        let err = resolve_universe(&provider, Some("A,B,a")).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Universe(UniverseError::DuplicateCode(code)) if code == "A"
        ));
    }

    #[test]
    fn provider_enumeration_is_sorted() {
        let provider = MockSeriesProvider::new()
            .with_series(make_series("ZZZ", &flat_closes(10)))
            .with_series(make_series("AAA", &flat_closes(10)));
        let universe = resolve_universe(&provider, None).unwrap();
        assert_eq!(universe.ids, vec!["AAA", "ZZZ"]);
    }
}

mod ranking {
    use super::*;

    fn provider() -> MockSeriesProvider {
        let mut tilted = rising_closes(300);
        for (i, close) in tilted.iter_mut().enumerate() {
            *close += 3.0 * ((i as f64) / 4.0).sin();
        }
        MockSeriesProvider::new()
            .with_series(make_series("UP", &rising_closes(300)))
            .with_series(make_series("UP2", &rising_closes(300)))
            .with_series(make_series("TILT", &tilted))
            .with_series(make_series("FLAT", &flat_closes(300)))
            .with_series(make_series("SWING", &swing_closes(300)))
            .with_series(make_series("V", &v_closes()))
    }

    fn ranked_ids(ids: &[&str], threads: Option<usize>) -> Vec<String> {
        let options = ScanOptions {
            threads,
            ..ScanOptions::default()
        };
        scan(&provider(), &universe(ids), &Strategy::core(), &options)
            .rows
            .into_iter()
            .map(|r| r.instrument_id)
            .collect()
    }

    #[test]
    fn order_is_independent_of_universe_order_and_pool() {
        let forward = ["UP", "UP2", "TILT", "FLAT", "SWING", "V"];
        let reversed = ["V", "SWING", "FLAT", "TILT", "UP2", "UP"];
        let expected = ranked_ids(&forward, None);

        assert_eq!(expected.len(), 6);
        assert_eq!(ranked_ids(&reversed, None), expected);
        assert_eq!(ranked_ids(&forward, Some(1)), expected);
        assert_eq!(ranked_ids(&reversed, Some(4)), expected);
    }

    #[test]
    fn identical_rows_break_ties_by_id() {
        let ids = ranked_ids(&["UP2", "UP", "FLAT"], None);
        assert_eq!(ids, vec!["UP", "UP2", "FLAT"]);
    }

    #[test]
    fn scores_are_non_increasing() {
        let report = scan(
            &provider(),
            &universe(&["UP", "TILT", "FLAT", "SWING", "V"]),
            &Strategy::core(),
            &ScanOptions::default(),
        );
        assert!(
            report
                .rows
                .windows(2)
                .all(|w| w[0].composite_score >= w[1].composite_score)
        );
        assert_eq!(report.rows.last().unwrap().instrument_id, "FLAT");
    }
}
