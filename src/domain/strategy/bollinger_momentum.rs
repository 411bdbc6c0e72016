//! Bollinger bands on the RSI/MFI blend ("RUA").
//!
//! Buy when the blend touches its lower band or crosses back above it. Sell
//! when the blend falls back inside from above the upper band. A collapsed
//! band (upper <= lower) carries no information and yields no action.
//!
//! With `trend_filter` set, entries additionally require the close above a
//! long EMA and a positive trend correlation.

use crate::domain::error::ScanError;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::linreg::calculate_trend_correlation;
use crate::domain::indicator::mfi::calculate_momentum_blend;
use crate::domain::indicator::{to_x100, IndicatorSeries, IndicatorType, RsiSmoothing};
use crate::domain::series::Series;
use crate::domain::strategy::{
    classify_bars, read_period, read_positive, read_smoothing, BarAction, SignalRule,
};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerMomentumParams {
    pub period: usize,
    pub band_period: usize,
    pub band_k: f64,
    pub smoothing: RsiSmoothing,
    pub trend_filter: bool,
    pub trend_ema: usize,
    pub trend_window: usize,
}

impl Default for BollingerMomentumParams {
    fn default() -> Self {
        Self {
            period: 14,
            band_period: 20,
            band_k: 2.0,
            smoothing: RsiSmoothing::Simple,
            trend_filter: false,
            trend_ema: 200,
            trend_window: 55,
        }
    }
}

impl BollingerMomentumParams {
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Result<Self, ScanError> {
        let d = Self::default();
        let params = Self {
            period: read_period(config, section, "period", d.period)?,
            band_period: read_period(config, section, "band_period", d.band_period)?,
            band_k: read_positive(config, section, "band_k", d.band_k)?,
            smoothing: read_smoothing(config, section, d.smoothing)?,
            trend_filter: config.get_bool(section, "trend_filter", d.trend_filter),
            trend_ema: read_period(config, section, "trend_ema", d.trend_ema)?,
            trend_window: read_period(config, section, "trend_window", d.trend_window)?,
        };
        if params.band_period < 2 {
            return Err(ScanError::ConfigInvalid {
                section: section.to_string(),
                key: "band_period".into(),
                reason: "must be at least 2".into(),
            });
        }
        Ok(params)
    }

    fn blend_type(&self) -> IndicatorType {
        IndicatorType::MomentumBlend {
            period: self.period,
            smoothing: self.smoothing,
        }
    }

    fn band_type(&self) -> IndicatorType {
        IndicatorType::Bollinger {
            period: self.band_period,
            stddev_mult_x100: to_x100(self.band_k),
        }
    }
}

struct TrendGate {
    ema: IndicatorSeries,
    correlation: IndicatorSeries,
}

impl TrendGate {
    /// `None` while either input is undefined.
    fn allows(&self, index: usize, close: f64) -> Option<bool> {
        let ema = self.ema.get(index)?;
        let correlation = self.correlation.get(index).unwrap_or(0.0);
        Some(close > ema && correlation > 0.0)
    }
}

impl SignalRule for BollingerMomentumParams {
    fn indicators(&self) -> Vec<IndicatorType> {
        let mut out = vec![self.blend_type(), self.band_type()];
        if self.trend_filter {
            out.push(IndicatorType::Ema(self.trend_ema));
            out.push(IndicatorType::LinReg(self.trend_window));
        }
        out
    }

    fn warmup(&self) -> usize {
        // Bands are computed on the blend, so their lookbacks stack; +1 for
        // the previous-bar comparison.
        let bands = self.blend_type().lookback() + self.band_type().lookback() + 1;
        if self.trend_filter {
            bands
                .max(IndicatorType::Ema(self.trend_ema).lookback())
                .max(IndicatorType::LinReg(self.trend_window).lookback())
        } else {
            bands
        }
    }

    fn classify(&self, series: &Series) -> Vec<BarAction> {
        let blend = calculate_momentum_blend(series, self.period, self.smoothing);
        let bands = calculate_bollinger(&blend.values, self.band_period, to_x100(self.band_k));
        let gate = self.trend_filter.then(|| {
            let closes = series.closes();
            TrendGate {
                ema: calculate_ema(&closes, self.trend_ema),
                correlation: calculate_trend_correlation(&closes, self.trend_window),
            }
        });
        let bars = series.bars();

        classify_bars(series.len(), self.warmup(), |i| {
            let (b, pb) = (blend.get(i)?, blend.get(i - 1)?);
            let (upper, lower) = bands.at(i)?;
            let (prev_upper, prev_lower) = bands.at(i - 1)?;
            if upper <= lower {
                return Some(BarAction::Hold);
            }

            let touched = b <= lower || (pb < prev_lower && b > lower);
            let allowed = match &gate {
                Some(gate) => gate.allows(i, bars[i].close)?,
                None => true,
            };
            let action = if touched && allowed {
                BarAction::Buy
            } else if pb >= prev_upper && b < upper {
                BarAction::Sell
            } else {
                BarAction::Hold
            };
            Some(action)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::bollinger::Bands;
    use crate::domain::strategy::test_support::*;

    const SAW: [f64; 3] = [1.0, 1.0, -0.5];

    /// Gently rising saw-tooth of `n` bars from 100.
    fn saw(n: usize) -> Vec<f64> {
        let mut closes = vec![100.0];
        for i in 1..n {
            closes.push(closes[i - 1] + SAW[i % 3]);
        }
        closes
    }

    /// Six bars moving `step` each, then 40 bars of saw-tooth scaled by `scale`.
    fn burst(mut closes: Vec<f64>, step: f64, scale: f64) -> Vec<f64> {
        for _ in 0..6 {
            let last = *closes.last().unwrap();
            closes.push(last + step);
        }
        for i in 0..40 {
            let last = *closes.last().unwrap();
            closes.push(last + SAW[i % 3] * scale);
        }
        closes
    }

    /// Saw-tooth, a six-bar plunge, then recovery.
    fn plunge() -> Vec<f64> {
        burst(saw(80), -4.0, 1.5)
    }

    fn blend_and_bands(series: &Series) -> (IndicatorSeries, Bands) {
        let p = BollingerMomentumParams::default();
        let blend = calculate_momentum_blend(series, p.period, p.smoothing);
        let bands = calculate_bollinger(&blend.values, p.band_period, to_x100(p.band_k));
        (blend, bands)
    }

    #[test]
    fn default_warmup() {
        assert_eq!(BollingerMomentumParams::default().warmup(), 34);
    }

    #[test]
    fn trend_filter_extends_warmup() {
        let params = BollingerMomentumParams {
            trend_filter: true,
            ..Default::default()
        };
        assert_eq!(params.warmup(), 199);
        assert_eq!(params.indicators().len(), 4);
    }

    #[test]
    fn plunge_touches_lower_band() {
        let actions = BollingerMomentumParams::default().classify(&series_from_closes(&plunge()));
        assert_eq!(first_index_of(&actions, BarAction::Buy), Some(80));
        let sell_after = actions[81..]
            .iter()
            .position(|a| *a == BarAction::Sell)
            .map(|p| p + 81);
        assert_eq!(sell_after, Some(100));
    }

    #[test]
    fn crossing_back_above_lower_band_buys() {
        let series = series_from_closes(&plunge());
        let (blend, bands) = blend_and_bands(&series);
        // At bar 86 the blend is already back above the lower band, having
        // been under it the bar before: no touch, only the cross-back.
        let (b, pb) = (blend.get(86).unwrap(), blend.get(85).unwrap());
        let (_, lower) = bands.at(86).unwrap();
        let (_, prev_lower) = bands.at(85).unwrap();
        assert!(b > lower && pb < prev_lower);

        let actions = BollingerMomentumParams::default().classify(&series);
        assert_eq!(actions[86], BarAction::Buy);
        assert_eq!(actions[87], BarAction::Hold);
    }

    #[test]
    fn falling_back_inside_upper_band_sells() {
        // A six-bar surge pushes the blend over its upper band; it slips back
        // inside at bar 84 with no lower-band contact anywhere near.
        let series = series_from_closes(&burst(saw(80), 4.0, 1.0));
        let (blend, bands) = blend_and_bands(&series);
        let (b, pb) = (blend.get(84).unwrap(), blend.get(83).unwrap());
        let (upper, lower) = bands.at(84).unwrap();
        let (prev_upper, _) = bands.at(83).unwrap();
        assert!(pb >= prev_upper && b < upper);
        assert!(b > lower);

        let actions = BollingerMomentumParams::default().classify(&series);
        assert_eq!(actions[84], BarAction::Sell);
        assert_eq!(actions[86], BarAction::Sell);
        assert_eq!(first_index_of(&actions, BarAction::Buy), Some(100));
    }

    #[test]
    fn open_trend_gate_lets_entries_through() {
        // 230 rising bars give the 200-bar EMA and 55-bar correlation time to
        // settle, so the plunge buy passes the gate.
        let closes = burst(saw(230), -4.0, 1.5);
        let series = series_from_closes(&closes);
        let ema = calculate_ema(&series.closes(), 200);
        assert!(closes[230] > ema.get(230).unwrap());
        let correlation = calculate_trend_correlation(&series.closes(), 55);
        assert!(correlation.get(230).unwrap() > 0.0);

        let params = BollingerMomentumParams {
            trend_filter: true,
            ..Default::default()
        };
        let actions = params.classify(&series);
        assert_eq!(first_index_of(&actions, BarAction::Buy), Some(230));
        assert_eq!(actions[236], BarAction::Buy);
        assert_eq!(first_index_of(&actions, BarAction::Sell), Some(250));
    }

    #[test]
    fn collapsed_band_holds() {
        let actions = BollingerMomentumParams::default().classify(&flat(120));
        assert!(actions.iter().all(|a| *a == BarAction::Hold));
    }

    #[test]
    fn trend_filter_blocks_entries_without_history() {
        // 126 bars never reach the 200-bar EMA, so the gate stays closed.
        let params = BollingerMomentumParams {
            trend_filter: true,
            ..Default::default()
        };
        let actions = params.classify(&series_from_closes(&plunge()));
        assert_eq!(first_index_of(&actions, BarAction::Buy), None);
    }
}
