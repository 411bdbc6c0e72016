//! Causal technical indicators.
//!
//! Every indicator maps an input of length N to an [`IndicatorSeries`] of
//! length N. A `None` entry means "not yet available": the indicator has not
//! seen enough defined input to produce a value at that index. The output at
//! index `i` never depends on input beyond `i`.

pub mod atr;
pub mod bollinger;
pub mod channel;
pub mod ema;
pub mod kernel;
pub mod linreg;
pub mod mfi;
pub mod rsi;
pub mod tema;
pub mod wma;

use std::fmt;

/// Averaging convention for RSI gains and losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RsiSmoothing {
    /// Plain mean over the trailing window.
    #[default]
    Simple,
    /// Wilder's recursive running average.
    Wilder,
}

impl RsiSmoothing {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" | "sma" => Some(RsiSmoothing::Simple),
            "wilder" | "rma" => Some(RsiSmoothing::Wilder),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Wma(usize),
    Hull(usize),
    WmaChain { inner: usize, outer: usize },
    Tema(usize),
    Rsi { period: usize, smoothing: RsiSmoothing },
    Mfi(usize),
    MomentumBlend { period: usize, smoothing: RsiSmoothing },
    Atr(usize),
    Bollinger { period: usize, stddev_mult_x100: u32 },
    LinReg(usize),
    Kernel { bandwidth_x100: u32, r_x100: u32, window: usize },
    RollingHigh(usize),
}

impl IndicatorType {
    /// Index of the first defined output when the input is defined from index 0.
    ///
    /// Bollinger is applied to another indicator, so its lookback is relative
    /// to the first defined input.
    pub fn lookback(&self) -> usize {
        match *self {
            IndicatorType::Ema(p)
            | IndicatorType::Wma(p)
            | IndicatorType::Tema(p)
            | IndicatorType::Atr(p)
            | IndicatorType::LinReg(p)
            | IndicatorType::RollingHigh(p) => p.saturating_sub(1),
            IndicatorType::Hull(p) => {
                p.saturating_sub(1) + wma::hull_smoothing_period(p).saturating_sub(1)
            }
            IndicatorType::WmaChain { inner, outer } => {
                inner.saturating_sub(1) + outer.saturating_sub(1)
            }
            IndicatorType::Rsi { period, .. }
            | IndicatorType::Mfi(period)
            | IndicatorType::MomentumBlend { period, .. } => period,
            IndicatorType::Bollinger { period, .. } => period.saturating_sub(1),
            IndicatorType::Kernel { window, .. } => window,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Wma(period) => write!(f, "WMA({})", period),
            IndicatorType::Hull(period) => write!(f, "HULL({})", period),
            IndicatorType::WmaChain { inner, outer } => {
                write!(f, "WMA(WMA({}),{})", inner, outer)
            }
            IndicatorType::Tema(period) => write!(f, "TEMA({})", period),
            IndicatorType::Rsi { period, smoothing } => match smoothing {
                RsiSmoothing::Simple => write!(f, "RSI({})", period),
                RsiSmoothing::Wilder => write!(f, "RSI_WILDER({})", period),
            },
            IndicatorType::Mfi(period) => write!(f, "MFI({})", period),
            IndicatorType::MomentumBlend { period, smoothing } => match smoothing {
                RsiSmoothing::Simple => write!(f, "BLEND({})", period),
                RsiSmoothing::Wilder => write!(f, "BLEND_WILDER({})", period),
            },
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::LinReg(window) => write!(f, "LINREG({})", window),
            IndicatorType::Kernel {
                bandwidth_x100,
                r_x100,
                window,
            } => write!(
                f,
                "KERNEL({},{},{})",
                *bandwidth_x100 as f64 / 100.0,
                *r_x100 as f64 / 100.0,
                window
            ),
            IndicatorType::RollingHigh(window) => write!(f, "HIGHEST({})", window),
        }
    }
}

/// Scale a float parameter into the integer form used by [`IndicatorType`].
pub fn to_x100(value: f64) -> u32 {
    (value * 100.0).round().max(0.0) as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn new(indicator_type: IndicatorType, values: Vec<Option<f64>>) -> Self {
        Self {
            indicator_type,
            values,
        }
    }

    /// All-undefined output of length `len`.
    pub fn undefined(indicator_type: IndicatorType, len: usize) -> Self {
        Self::new(indicator_type, vec![None; len])
    }

    /// Value at `index`; `None` when undefined or out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_defined(&self) -> Option<usize> {
        first_defined(&self.values)
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }
}

pub fn first_defined(values: &[Option<f64>]) -> Option<usize> {
    values.iter().position(Option::is_some)
}

/// Element-wise combination, undefined wherever either side is undefined.
pub fn combine(
    a: &[Option<f64>],
    b: &[Option<f64>],
    f: impl Fn(f64, f64) -> f64,
) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}

/// Trailing window ending at `end`, or `None` if it is short or holds an undefined value.
pub(crate) fn defined_window(values: &[Option<f64>], end: usize, len: usize) -> Option<Vec<f64>> {
    if len == 0 || end + 1 < len || end >= values.len() {
        return None;
    }
    values[end + 1 - len..=end].iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Ema(20).to_string(), "EMA(20)");
        assert_eq!(IndicatorType::Hull(144).to_string(), "HULL(144)");
        assert_eq!(
            IndicatorType::WmaChain { inner: 10, outer: 89 }.to_string(),
            "WMA(WMA(10),89)"
        );
    }

    #[test]
    fn indicator_type_display_bollinger() {
        let boll = IndicatorType::Bollinger {
            period: 20,
            stddev_mult_x100: 200,
        };
        assert_eq!(boll.to_string(), "BOLLINGER(20,2)");
    }

    #[test]
    fn rsi_variants_display_distinctly() {
        let simple = IndicatorType::Rsi {
            period: 14,
            smoothing: RsiSmoothing::Simple,
        };
        let wilder = IndicatorType::Rsi {
            period: 14,
            smoothing: RsiSmoothing::Wilder,
        };
        assert_ne!(simple, wilder);
        assert_eq!(simple.to_string(), "RSI(14)");
        assert_eq!(wilder.to_string(), "RSI_WILDER(14)");
    }

    #[test]
    fn lookbacks() {
        assert_eq!(IndicatorType::Ema(5).lookback(), 4);
        assert_eq!(IndicatorType::Hull(89).lookback(), 88 + 8);
        assert_eq!(IndicatorType::Hull(144).lookback(), 143 + 11);
        assert_eq!(IndicatorType::WmaChain { inner: 10, outer: 89 }.lookback(), 97);
        assert_eq!(IndicatorType::Mfi(14).lookback(), 14);
        assert_eq!(
            IndicatorType::Kernel {
                bandwidth_x100: 800,
                r_x100: 800,
                window: 25
            }
            .lookback(),
            25
        );
        assert_eq!(IndicatorType::Ema(0).lookback(), 0);
    }

    #[test]
    fn rsi_smoothing_parse() {
        assert_eq!(RsiSmoothing::parse("Wilder"), Some(RsiSmoothing::Wilder));
        assert_eq!(RsiSmoothing::parse(" simple "), Some(RsiSmoothing::Simple));
        assert_eq!(RsiSmoothing::parse("ewm"), None);
    }

    #[test]
    fn indicator_series_accessors() {
        let series = IndicatorSeries::new(IndicatorType::Ema(2), vec![None, Some(1.5), Some(2.0)]);
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), Some(1.5));
        assert_eq!(series.get(9), None);
        assert_eq!(series.first_defined(), Some(1));
        assert_eq!(series.last(), Some(2.0));
    }

    #[test]
    fn combine_propagates_undefined() {
        let a = [None, Some(2.0), Some(3.0)];
        let b = [Some(1.0), None, Some(1.0)];
        assert_eq!(combine(&a, &b, |x, y| x - y), vec![None, None, Some(2.0)]);
    }

    #[test]
    fn defined_window_bounds() {
        let values = [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)];
        assert_eq!(defined_window(&values, 1, 2), Some(vec![1.0, 2.0]));
        assert_eq!(defined_window(&values, 3, 2), None);
        assert_eq!(defined_window(&values, 4, 2), Some(vec![4.0, 5.0]));
        assert_eq!(defined_window(&values, 0, 2), None);
        assert_eq!(defined_window(&values, 4, 0), None);
    }

    #[test]
    fn to_x100_rounds() {
        assert_eq!(to_x100(2.0), 200);
        assert_eq!(to_x100(2.5), 250);
    }
}
