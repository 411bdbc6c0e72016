//! Last-bar trend context: straightness of recent closes, the EMA ribbon,
//! the regression channel and a volume surge flag.
//!
//! None of it feeds back into strategy state. The correlation breaks ranking
//! ties; everything else is reported as-is.

use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::linreg::fit;
use crate::domain::series::Series;
use std::fmt;

/// Fibonacci EMA ribbon, fastest first.
pub const RIBBON_PERIODS: [usize; 8] = [8, 13, 21, 34, 55, 89, 144, 233];

pub const DEFAULT_CORRELATION_WINDOW: usize = 55;

/// Windows of the multi-horizon Pearson columns.
pub const PEARSON_WINDOWS: [usize; 7] = [55, 89, 144, 233, 377, 610, 987];

pub const CHANNEL_WINDOW: usize = 233;
/// Band half-width in residual standard deviations.
pub const CHANNEL_WIDTH: f64 = 2.0;

pub const VOLUME_SURGE_WINDOW: usize = 10;
pub const VOLUME_SURGE_RATIO: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RibbonStatus {
    /// close > EMA8 > EMA13 > ... > EMA233
    IdealUp,
    /// Close above every ribbon EMA, but the EMAs are not stacked.
    Up,
    Down,
    /// Too little history for the slowest EMA.
    #[default]
    Undetermined,
}

impl fmt::Display for RibbonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RibbonStatus::IdealUp => "IDEAL_UP",
            RibbonStatus::Up => "UP",
            RibbonStatus::Down => "DOWN",
            RibbonStatus::Undetermined => "-",
        };
        f.pad(s)
    }
}

/// Least-squares line through the trailing closes, widened by
/// [`CHANNEL_WIDTH`] residual deviations, evaluated at the last bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionChannel {
    pub window: usize,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (upper - close) / close, in percent.
    pub upper_distance_pct: f64,
    /// (close - lower) / close, in percent.
    pub lower_distance_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendSnapshot {
    pub correlation: Option<f64>,
    pub ribbon: RibbonStatus,
    /// Pearson r per [`PEARSON_WINDOWS`] entry.
    pub pearson: [Option<f64>; PEARSON_WINDOWS.len()],
    pub channel: Option<RegressionChannel>,
    /// `None` without a volume column or enough bars.
    pub volume_surge: Option<bool>,
}

impl TrendSnapshot {
    pub fn at_last_bar(series: &Series, correlation_window: usize) -> Self {
        Self {
            correlation: trend_correlation(series, correlation_window),
            ribbon: ribbon_status(series),
            pearson: PEARSON_WINDOWS.map(|window| trend_correlation(series, window)),
            channel: regression_channel(series, CHANNEL_WINDOW),
            volume_surge: volume_surge(series),
        }
    }
}

fn tail_closes(series: &Series, window: usize) -> Option<Vec<f64>> {
    let bars = series.bars();
    if window < 2 || bars.len() < window {
        return None;
    }
    Some(bars[bars.len() - window..].iter().map(|b| b.close).collect())
}

/// Pearson r of the last `window` closes against their index. `None` when
/// the series is shorter than the window or the closes do not vary.
pub fn trend_correlation(series: &Series, window: usize) -> Option<f64> {
    fit(&tail_closes(series, window)?)?.correlation
}

/// Channel over the last `window` closes; `None` when the series is shorter.
pub fn regression_channel(series: &Series, window: usize) -> Option<RegressionChannel> {
    let tail = tail_closes(series, window)?;
    let line = fit(&tail)?;
    let close = *tail.last()?;
    let band = CHANNEL_WIDTH * line.residual_std(&tail);
    let middle = line.at(window - 1);
    let upper = middle + band;
    let lower = middle - band;
    Some(RegressionChannel {
        window,
        upper,
        middle,
        lower,
        upper_distance_pct: (upper - close) / close * 100.0,
        lower_distance_pct: (close - lower) / close * 100.0,
    })
}

/// Last volume above [`VOLUME_SURGE_RATIO`] times the mean of the last
/// [`VOLUME_SURGE_WINDOW`] volumes, the last one included.
pub fn volume_surge(series: &Series) -> Option<bool> {
    let bars = series.bars();
    if !series.has_volume() || bars.len() < VOLUME_SURGE_WINDOW {
        return None;
    }
    let recent = &bars[bars.len() - VOLUME_SURGE_WINDOW..];
    let mean = recent.iter().map(|b| b.volume).sum::<f64>() / VOLUME_SURGE_WINDOW as f64;
    let last = recent.last()?.volume;
    Some(last > mean * VOLUME_SURGE_RATIO)
}

pub fn ribbon_status(series: &Series) -> RibbonStatus {
    let Some(last) = series.last() else {
        return RibbonStatus::Undetermined;
    };
    let closes = series.closes();
    let index = series.len() - 1;

    let mut emas = Vec::with_capacity(RIBBON_PERIODS.len());
    for period in RIBBON_PERIODS {
        match calculate_ema(&closes, period).get(index) {
            Some(value) => emas.push(value),
            None => return RibbonStatus::Undetermined,
        }
    }

    let close = last.close;
    let stacked = close > emas[0] && emas.windows(2).all(|pair| pair[0] > pair[1]);
    if stacked {
        RibbonStatus::IdealUp
    } else if emas.iter().all(|&ema| close > ema) {
        RibbonStatus::Up
    } else {
        RibbonStatus::Down
    }
}
