//! Fast/slow TEMA crossover ("BUM").

use crate::domain::error::ScanError;
use crate::domain::indicator::tema::calculate_tema;
use crate::domain::indicator::IndicatorType;
use crate::domain::series::Series;
use crate::domain::strategy::{
    classify_bars, crossed_above, crossed_below, read_period, BarAction, SignalRule,
};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemaCrossParams {
    pub fast: usize,
    pub slow: usize,
}

impl Default for TemaCrossParams {
    fn default() -> Self {
        Self { fast: 34, slow: 68 }
    }
}

impl TemaCrossParams {
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Result<Self, ScanError> {
        let d = Self::default();
        Ok(Self {
            fast: read_period(config, section, "fast", d.fast)?,
            slow: read_period(config, section, "slow", d.slow)?,
        })
    }
}

impl SignalRule for TemaCrossParams {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Tema(self.fast), IndicatorType::Tema(self.slow)]
    }

    fn warmup(&self) -> usize {
        self.fast.max(self.slow)
    }

    fn classify(&self, series: &Series) -> Vec<BarAction> {
        let closes = series.closes();
        let fast = calculate_tema(&closes, self.fast);
        let slow = calculate_tema(&closes, self.slow);

        classify_bars(series.len(), self.warmup(), |i| {
            let (f, pf) = (fast.get(i)?, fast.get(i - 1)?);
            let (s, ps) = (slow.get(i)?, slow.get(i - 1)?);
            let action = if crossed_above(pf, f, ps, s) {
                BarAction::Buy
            } else if crossed_below(pf, f, ps, s) {
                BarAction::Sell
            } else {
                BarAction::Hold
            };
            Some(action)
        })
    }
}
