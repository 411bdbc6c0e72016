//! Close against the WMA-chained Hull approximation ("HULLWMA").

use crate::domain::error::ScanError;
use crate::domain::indicator::wma::calculate_wma_chain;
use crate::domain::indicator::IndicatorType;
use crate::domain::series::Series;
use crate::domain::strategy::{classify_bars, read_period, BarAction, SignalRule};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullChainParams {
    pub inner: usize,
    pub outer: usize,
}

impl Default for HullChainParams {
    fn default() -> Self {
        Self {
            inner: 10,
            outer: 89,
        }
    }
}

impl HullChainParams {
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Result<Self, ScanError> {
        let d = Self::default();
        Ok(Self {
            inner: read_period(config, section, "inner", d.inner)?,
            outer: read_period(config, section, "outer", d.outer)?,
        })
    }

    fn chain_type(&self) -> IndicatorType {
        IndicatorType::WmaChain {
            inner: self.inner,
            outer: self.outer,
        }
    }
}

impl SignalRule for HullChainParams {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![self.chain_type()]
    }

    fn warmup(&self) -> usize {
        self.chain_type().lookback()
    }

    fn classify(&self, series: &Series) -> Vec<BarAction> {
        let chain = calculate_wma_chain(&series.closes(), self.inner, self.outer);
        let bars = series.bars();

        classify_bars(series.len(), self.warmup(), |i| {
            let line = chain.get(i)?;
            let close = bars[i].close;
            let action = if close > line {
                BarAction::Buy
            } else if close < line {
                BarAction::Sell
            } else {
                BarAction::Hold
            };
            Some(action)
        })
    }
}
