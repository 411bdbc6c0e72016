//! ATR-offset channel breakout with a kernel exit ("TRENDLINER", "QnR").
//!
//! The trend line sits `multiplier` ATRs under the rolling high. Buy while
//! the close is above it. Once the close falls under it, sell only if the
//! kernel estimate has stopped rising.

use crate::domain::error::ScanError;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::channel::calculate_rolling_high;
use crate::domain::indicator::kernel::{calculate_kernel, KernelParams};
use crate::domain::indicator::IndicatorType;
use crate::domain::series::Series;
use crate::domain::strategy::{classify_bars, read_period, read_positive, BarAction, SignalRule};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelKernelParams {
    pub channel: usize,
    pub atr_period: usize,
    pub multiplier: f64,
    pub kernel: KernelParams,
}

impl Default for ChannelKernelParams {
    fn default() -> Self {
        Self {
            channel: 22,
            atr_period: 14,
            multiplier: 3.0,
            kernel: KernelParams::default(),
        }
    }
}

impl ChannelKernelParams {
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Result<Self, ScanError> {
        let d = Self::default();
        Ok(Self {
            channel: read_period(config, section, "channel", d.channel)?,
            atr_period: read_period(config, section, "atr_period", d.atr_period)?,
            multiplier: read_positive(config, section, "multiplier", d.multiplier)?,
            kernel: KernelParams {
                bandwidth: read_positive(config, section, "bandwidth", d.kernel.bandwidth)?,
                r: read_positive(config, section, "kernel_r", d.kernel.r)?,
                window: read_period(config, section, "kernel_window", d.kernel.window)?,
            },
        })
    }
}

impl SignalRule for ChannelKernelParams {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::RollingHigh(self.channel),
            IndicatorType::Atr(self.atr_period),
            self.kernel.indicator_type(),
        ]
    }

    fn warmup(&self) -> usize {
        self.indicators()
            .iter()
            .map(IndicatorType::lookback)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn classify(&self, series: &Series) -> Vec<BarAction> {
        let highest = calculate_rolling_high(&series.highs(), self.channel);
        let atr = calculate_atr(series, self.atr_period);
        let kernel = calculate_kernel(&series.closes(), self.kernel);
        let bars = series.bars();

        classify_bars(series.len(), self.warmup(), |i| {
            let line = highest.get(i)? - self.multiplier * atr.get(i)?;
            let (k, pk) = (kernel.get(i)?, kernel.get(i - 1)?);
            let action = if bars[i].close > line {
                BarAction::Buy
            } else if k <= pk {
                BarAction::Sell
            } else {
                BarAction::Hold
            };
            Some(action)
        })
    }
}
