//! Bollinger Bands over an arbitrary input series.
//!
//! Middle is the SMA over n values; upper and lower are
//! middle +/- multiplier * stddev, with the sample standard deviation
//! (divides by n-1). Warmup: (n-1) values after the first defined input.

use crate::domain::indicator::{defined_window, IndicatorSeries, IndicatorType};

#[derive(Debug, Clone, PartialEq)]
pub struct Bands {
    pub upper: IndicatorSeries,
    pub lower: IndicatorSeries,
}

impl Bands {
    /// Upper and lower at `index`, if both are defined.
    pub fn at(&self, index: usize) -> Option<(f64, f64)> {
        Some((self.upper.get(index)?, self.lower.get(index)?))
    }
}

pub fn calculate_bollinger(values: &[Option<f64>], period: usize, stddev_mult_x100: u32) -> Bands {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult_x100,
    };
    let mult = stddev_mult_x100 as f64 / 100.0;

    let (upper, lower): (Vec<Option<f64>>, Vec<Option<f64>>) = (0..values.len())
        .map(|i| {
            if period < 2 {
                return (None, None);
            }
            match defined_window(values, i, period) {
                Some(window) => {
                    let n = period as f64;
                    let middle = window.iter().sum::<f64>() / n;
                    let variance = window
                        .iter()
                        .map(|v| {
                            let diff = v - middle;
                            diff * diff
                        })
                        .sum::<f64>()
                        / (n - 1.0);
                    let stddev = variance.sqrt();
                    (Some(middle + mult * stddev), Some(middle - mult * stddev))
                }
                None => (None, None),
            }
        })
        .unzip();

    Bands {
        upper: IndicatorSeries::new(indicator_type, upper),
        lower: IndicatorSeries::new(indicator_type, lower),
    }
}
