//! Mid-term Hull slope ("HULL144"): long while Hull(144) is rising.

use crate::domain::error::ScanError;
use crate::domain::indicator::wma::calculate_hull;
use crate::domain::indicator::IndicatorType;
use crate::domain::series::Series;
use crate::domain::strategy::{classify_bars, read_period, BarAction, SignalRule};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassicHullParams {
    pub period: usize,
}

impl Default for ClassicHullParams {
    fn default() -> Self {
        Self { period: 144 }
    }
}

impl ClassicHullParams {
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Result<Self, ScanError> {
        Ok(Self {
            period: read_period(config, section, "period", Self::default().period)?,
        })
    }
}

impl SignalRule for ClassicHullParams {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Hull(self.period)]
    }

    fn warmup(&self) -> usize {
        IndicatorType::Hull(self.period).lookback() + 1
    }

    fn classify(&self, series: &Series) -> Vec<BarAction> {
        let hull = calculate_hull(&series.closes(), self.period);

        classify_bars(series.len(), self.warmup(), |i| {
            let (h, ph) = (hull.get(i)?, hull.get(i - 1)?);
            let action = if h > ph {
                BarAction::Buy
            } else if h < ph {
                BarAction::Sell
            } else {
                BarAction::Hold
            };
            Some(action)
        })
    }
}
