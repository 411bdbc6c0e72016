//! Named signal strategies.
//!
//! Each strategy is a parameter struct implementing [`SignalRule`]: it lists
//! the indicators it reads, derives its warm-up from their lookbacks, and
//! classifies every bar as buy, sell or hold. Position tracking is shared and
//! lives in [`crate::domain::backtest`].

pub mod bollinger_momentum;
pub mod channel_kernel;
pub mod classic_hull;
pub mod dual_ema_slope;
pub mod hull_atr;
pub mod hull_chain;
pub mod momentum_blend;
pub mod tema_cross;

use crate::domain::error::ScanError;
use crate::domain::indicator::{IndicatorType, RsiSmoothing};
use crate::domain::series::Series;
use crate::ports::config_port::ConfigPort;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub use bollinger_momentum::BollingerMomentumParams;
pub use channel_kernel::ChannelKernelParams;
pub use classic_hull::ClassicHullParams;
pub use dual_ema_slope::DualEmaSlopeParams;
pub use hull_atr::HullAtrParams;
pub use hull_chain::HullChainParams;
pub use momentum_blend::MomentumBlendParams;
pub use tema_cross::TemaCrossParams;

/// Per-bar classification before position state is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarAction {
    Buy,
    Sell,
    Hold,
}

pub trait SignalRule {
    /// Indicators the rule reads.
    fn indicators(&self) -> Vec<IndicatorType>;

    /// First bar index at which every input the rule reads is defined.
    fn warmup(&self) -> usize;

    /// One action per bar; bars before [`SignalRule::warmup`] are `Hold`.
    fn classify(&self, series: &Series) -> Vec<BarAction>;
}

/// Apply `decide` from `warmup` onwards. `None` means an input was undefined.
pub(crate) fn classify_bars(
    len: usize,
    warmup: usize,
    decide: impl Fn(usize) -> Option<BarAction>,
) -> Vec<BarAction> {
    (0..len)
        .map(|i| {
            if i < warmup {
                BarAction::Hold
            } else {
                decide(i).unwrap_or(BarAction::Hold)
            }
        })
        .collect()
}

pub(crate) fn crossed_above(prev_a: f64, a: f64, prev_b: f64, b: f64) -> bool {
    a > b && prev_a <= prev_b
}

pub(crate) fn crossed_below(prev_a: f64, a: f64, prev_b: f64, b: f64) -> bool {
    a < b && prev_a >= prev_b
}

/// The seven strategies scanned by default.
pub const CORE_CODES: [&str; 7] = [
    "FRM",
    "BUM",
    "TREF",
    "RUA",
    "MATLRNS",
    "TRENDLINER",
    "HULL144",
];

/// Every registered strategy code.
pub const ALL_CODES: [&str; 8] = [
    "FRM",
    "BUM",
    "TREF",
    "RUA",
    "MATLRNS",
    "TRENDLINER",
    "HULL144",
    "HULLWMA",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    HullAtr(HullAtrParams),
    TemaCross(TemaCrossParams),
    MomentumBlend(MomentumBlendParams),
    BollingerMomentum(BollingerMomentumParams),
    DualEmaSlope(DualEmaSlopeParams),
    ChannelKernel(ChannelKernelParams),
    ClassicHull(ClassicHullParams),
    HullChain(HullChainParams),
}

impl Strategy {
    pub fn code(&self) -> &'static str {
        match self {
            Strategy::HullAtr(_) => "FRM",
            Strategy::TemaCross(_) => "BUM",
            Strategy::MomentumBlend(_) => "TREF",
            Strategy::BollingerMomentum(_) => "RUA",
            Strategy::DualEmaSlope(_) => "MATLRNS",
            Strategy::ChannelKernel(_) => "TRENDLINER",
            Strategy::ClassicHull(_) => "HULL144",
            Strategy::HullChain(_) => "HULLWMA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::HullAtr(_) => "Hull+ATR",
            Strategy::TemaCross(_) => "TEMA cross",
            Strategy::MomentumBlend(_) => "Momentum blend",
            Strategy::BollingerMomentum(_) => "Bollinger on momentum",
            Strategy::DualEmaSlope(_) => "Dual EMA slope",
            Strategy::ChannelKernel(_) => "Channel breakout + kernel",
            Strategy::ClassicHull(_) => "Classic Hull",
            Strategy::HullChain(_) => "WMA-chained Hull",
        }
    }

    pub fn rule(&self) -> &dyn SignalRule {
        match self {
            Strategy::HullAtr(p) => p,
            Strategy::TemaCross(p) => p,
            Strategy::MomentumBlend(p) => p,
            Strategy::BollingerMomentum(p) => p,
            Strategy::DualEmaSlope(p) => p,
            Strategy::ChannelKernel(p) => p,
            Strategy::ClassicHull(p) => p,
            Strategy::HullChain(p) => p,
        }
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        self.rule().indicators()
    }

    pub fn warmup(&self) -> usize {
        self.rule().warmup()
    }

    /// Fewest bars for which at least one bar is evaluated.
    pub fn min_history(&self) -> usize {
        self.warmup() + 1
    }

    pub fn classify(&self, series: &Series) -> Vec<BarAction> {
        self.rule().classify(series)
    }

    /// Strategy with default parameters for `code` (case-insensitive).
    pub fn from_code(code: &str) -> Result<Self, ScanError> {
        let strategy = match code.trim().to_ascii_uppercase().as_str() {
            "FRM" => Strategy::HullAtr(HullAtrParams::default()),
            "BUM" => Strategy::TemaCross(TemaCrossParams::default()),
            "TREF" => Strategy::MomentumBlend(MomentumBlendParams::default()),
            "RUA" => Strategy::BollingerMomentum(BollingerMomentumParams::default()),
            "MATLRNS" => Strategy::DualEmaSlope(DualEmaSlopeParams::default()),
            "TRENDLINER" | "QNR" => Strategy::ChannelKernel(ChannelKernelParams::default()),
            "HULL144" => Strategy::ClassicHull(ClassicHullParams::default()),
            "HULLWMA" => Strategy::HullChain(HullChainParams::default()),
            _ => return Err(ScanError::UnknownStrategy(code.trim().to_string())),
        };
        Ok(strategy)
    }

    /// Strategy for `code` with overrides from `[strategy.<code>]`.
    pub fn from_config(code: &str, config: &dyn ConfigPort) -> Result<Self, ScanError> {
        let base = Self::from_code(code)?;
        let section = format!("strategy.{}", base.code().to_ascii_lowercase());
        let section = section.as_str();
        let strategy = match base {
            Strategy::HullAtr(_) => Strategy::HullAtr(HullAtrParams::from_config(config, section)?),
            Strategy::TemaCross(_) => {
                Strategy::TemaCross(TemaCrossParams::from_config(config, section)?)
            }
            Strategy::MomentumBlend(_) => {
                Strategy::MomentumBlend(MomentumBlendParams::from_config(config, section)?)
            }
            Strategy::BollingerMomentum(_) => {
                Strategy::BollingerMomentum(BollingerMomentumParams::from_config(config, section)?)
            }
            Strategy::DualEmaSlope(_) => {
                Strategy::DualEmaSlope(DualEmaSlopeParams::from_config(config, section)?)
            }
            Strategy::ChannelKernel(_) => {
                Strategy::ChannelKernel(ChannelKernelParams::from_config(config, section)?)
            }
            Strategy::ClassicHull(_) => {
                Strategy::ClassicHull(ClassicHullParams::from_config(config, section)?)
            }
            Strategy::HullChain(_) => {
                Strategy::HullChain(HullChainParams::from_config(config, section)?)
            }
        };
        Ok(strategy)
    }

    pub fn core() -> Vec<Strategy> {
        CORE_CODES
            .iter()
            .filter_map(|code| Self::from_code(code).ok())
            .collect()
    }

    pub fn all() -> Vec<Strategy> {
        ALL_CODES
            .iter()
            .filter_map(|code| Self::from_code(code).ok())
            .collect()
    }

    /// Expand `CORE`, `ALL`, or a comma-separated code list into codes.
    pub fn parse_codes(input: &str) -> Result<Vec<String>, ScanError> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("core") || trimmed.is_empty() {
            return Ok(CORE_CODES.iter().map(|c| c.to_string()).collect());
        }
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(ALL_CODES.iter().map(|c| c.to_string()).collect());
        }

        let mut codes = Vec::new();
        let mut seen = HashSet::new();
        for token in trimmed.split(',') {
            let code = Self::from_code(token)?.code().to_string();
            if !seen.insert(code.clone()) {
                return Err(ScanError::ConfigInvalid {
                    section: "scan".into(),
                    key: "strategies".into(),
                    reason: format!("duplicate strategy {code}"),
                });
            }
            codes.push(code);
        }
        Ok(codes)
    }

    /// Parse a strategy list, reading per-strategy overrides from `config`.
    pub fn parse_list(input: &str, config: &dyn ConfigPort) -> Result<Vec<Strategy>, ScanError> {
        Self::parse_codes(input)?
            .iter()
            .map(|code| Self::from_config(code, config))
            .collect()
    }
}

impl FromStr for Strategy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

pub(crate) fn read_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, ScanError> {
    let value = config.get_int(section, key, default as i64);
    if value < 1 {
        return Err(ScanError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("must be a positive integer, got {value}"),
        });
    }
    Ok(value as usize)
}

pub(crate) fn read_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ScanError> {
    let value = config.get_double(section, key, default);
    if !(value.is_finite() && value > 0.0) {
        return Err(ScanError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("must be positive, got {value}"),
        });
    }
    Ok(value)
}

pub(crate) fn read_smoothing(
    config: &dyn ConfigPort,
    section: &str,
    default: RsiSmoothing,
) -> Result<RsiSmoothing, ScanError> {
    match config.get_string(section, "rsi") {
        None => Ok(default),
        Some(raw) => RsiSmoothing::parse(&raw).ok_or_else(|| ScanError::ConfigInvalid {
            section: section.to_string(),
            key: "rsi".into(),
            reason: format!("expected simple or wilder, got {raw}"),
        }),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::series::{PriceBar, Series};
    use chrono::NaiveDate;

    /// Close-only series: high = low = close, constant volume.
    pub fn series_from_closes(closes: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect();
        Series::new("TEST", bars).unwrap()
    }

    pub fn flat(n: usize) -> Series {
        series_from_closes(&vec![100.0; n])
    }

    /// 1% compounding daily rise.
    pub fn rising(n: usize) -> Series {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 * 1.01_f64.powi(i as i32)).collect();
        series_from_closes(&closes)
    }

    pub fn first_index_of(
        actions: &[super::BarAction],
        action: super::BarAction,
    ) -> Option<usize> {
        actions.iter().position(|a| *a == action)
    }
}
