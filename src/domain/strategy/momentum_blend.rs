//! RSI/MFI momentum blend ("TREF").
//!
//! Buy when the blend crosses above the entry level while a short EMA of the
//! close is rising; sell once the blend falls under the exit level.

use crate::domain::error::ScanError;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::mfi::calculate_momentum_blend;
use crate::domain::indicator::{IndicatorType, RsiSmoothing};
use crate::domain::series::Series;
use crate::domain::strategy::{
    classify_bars, read_period, read_positive, read_smoothing, BarAction, SignalRule,
};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumBlendParams {
    pub period: usize,
    pub ema_period: usize,
    pub entry_level: f64,
    pub exit_level: f64,
    pub smoothing: RsiSmoothing,
}

impl Default for MomentumBlendParams {
    fn default() -> Self {
        Self {
            period: 14,
            ema_period: 5,
            entry_level: 50.0,
            exit_level: 40.0,
            smoothing: RsiSmoothing::Simple,
        }
    }
}

impl MomentumBlendParams {
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Result<Self, ScanError> {
        let d = Self::default();
        let params = Self {
            period: read_period(config, section, "period", d.period)?,
            ema_period: read_period(config, section, "ema_period", d.ema_period)?,
            entry_level: read_positive(config, section, "entry_level", d.entry_level)?,
            exit_level: read_positive(config, section, "exit_level", d.exit_level)?,
            smoothing: read_smoothing(config, section, d.smoothing)?,
        };
        if params.exit_level > params.entry_level {
            return Err(ScanError::ConfigInvalid {
                section: section.to_string(),
                key: "exit_level".into(),
                reason: "must not exceed entry_level".into(),
            });
        }
        Ok(params)
    }
}

impl SignalRule for MomentumBlendParams {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::MomentumBlend {
                period: self.period,
                smoothing: self.smoothing,
            },
            IndicatorType::Ema(self.ema_period),
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
        let blend = calculate_momentum_blend(series, self.period, self.smoothing);
        let ema = calculate_ema(&series.closes(), self.ema_period);

        classify_bars(series.len(), self.warmup(), |i| {
            let (b, pb) = (blend.get(i)?, blend.get(i - 1)?);
            let ema_rising = ema.get(i)? > ema.get(i - 1)?;
            let action = if b > self.entry_level && pb <= self.entry_level && ema_rising {
                BarAction::Buy
            } else if b < self.exit_level {
                BarAction::Sell
            } else {
                BarAction::Hold
            };
            Some(action)
        })
    }
}
