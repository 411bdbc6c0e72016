//! Hull + ATR breakout ("FRM").
//!
//! Buy when the close is above the Hull average and has jumped more than one
//! ATR over the previous close. Sell when the close drops under the Hull.

use crate::domain::error::ScanError;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::wma::calculate_hull;
use crate::domain::indicator::IndicatorType;
use crate::domain::series::Series;
use crate::domain::strategy::{classify_bars, read_period, BarAction, SignalRule};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullAtrParams {
    pub hull_period: usize,
    pub atr_period: usize,
}

impl Default for HullAtrParams {
    fn default() -> Self {
        Self {
            hull_period: 89,
            atr_period: 14,
        }
    }
}

impl HullAtrParams {
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Result<Self, ScanError> {
        let d = Self::default();
        Ok(Self {
            hull_period: read_period(config, section, "hull_period", d.hull_period)?,
            atr_period: read_period(config, section, "atr_period", d.atr_period)?,
        })
    }
}

impl SignalRule for HullAtrParams {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Hull(self.hull_period),
            IndicatorType::Atr(self.atr_period),
        ]
    }

    fn warmup(&self) -> usize {
        // +1: the breakout compares against the previous close.
        self.indicators()
            .iter()
            .map(IndicatorType::lookback)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn classify(&self, series: &Series) -> Vec<BarAction> {
        let hull = calculate_hull(&series.closes(), self.hull_period);
        let atr = calculate_atr(series, self.atr_period);
        let bars = series.bars();

        classify_bars(series.len(), self.warmup(), |i| {
            let hull = hull.get(i)?;
            let atr = atr.get(i)?;
            let close = bars[i].close;
            let action = if close > hull && close > bars[i - 1].close + atr {
                BarAction::Buy
            } else if close < hull {
                BarAction::Sell
            } else {
                BarAction::Hold
            };
            Some(action)
        })
    }
}
