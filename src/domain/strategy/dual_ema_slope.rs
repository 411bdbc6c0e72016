//! Dual EMA slope ("MATLRNS").
//!
//! Buy when both the fast and the slow EMA sit above their own value
//! `lookback` bars ago; sell when both sit below it.

use crate::domain::error::ScanError;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::IndicatorType;
use crate::domain::series::Series;
use crate::domain::strategy::{classify_bars, read_period, BarAction, SignalRule};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualEmaSlopeParams {
    pub fast: usize,
    pub slow: usize,
    pub lookback: usize,
}

impl Default for DualEmaSlopeParams {
    fn default() -> Self {
        Self {
            fast: 8,
            slow: 21,
            lookback: 9,
        }
    }
}

impl DualEmaSlopeParams {
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Result<Self, ScanError> {
        let d = Self::default();
        Ok(Self {
            fast: read_period(config, section, "fast", d.fast)?,
            slow: read_period(config, section, "slow", d.slow)?,
            lookback: read_period(config, section, "lookback", d.lookback)?,
        })
    }
}

impl SignalRule for DualEmaSlopeParams {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Ema(self.fast), IndicatorType::Ema(self.slow)]
    }

    fn warmup(&self) -> usize {
        let ema = self
            .indicators()
            .iter()
            .map(IndicatorType::lookback)
            .max()
            .unwrap_or(0);
        ema + self.lookback
    }

    fn classify(&self, series: &Series) -> Vec<BarAction> {
        let closes = series.closes();
        let fast = calculate_ema(&closes, self.fast);
        let slow = calculate_ema(&closes, self.slow);
        let lb = self.lookback;

        classify_bars(series.len(), self.warmup(), |i| {
            let fast_delta = fast.get(i)? - fast.get(i - lb)?;
            let slow_delta = slow.get(i)? - slow.get(i - lb)?;
            let action = if fast_delta > 0.0 && slow_delta > 0.0 {
                BarAction::Buy
            } else if fast_delta < 0.0 && slow_delta < 0.0 {
                BarAction::Sell
            } else {
                BarAction::Hold
            };
            Some(action)
        })
    }
}
