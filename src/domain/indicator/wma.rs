//! Weighted moving averages and the two Hull conventions built on them.
//!
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//!
//! Each window is summed directly rather than with a sliding update, so two
//! identical windows always yield bit-identical outputs.

use crate::domain::indicator::{combine, defined_window, IndicatorSeries, IndicatorType};

pub fn calculate_wma(values: &[Option<f64>], period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Wma(period), wma_values(values, period))
}

fn wma_values(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let divisor = (period * (period + 1)) as f64 / 2.0;
    (0..values.len())
        .map(|i| {
            let window = defined_window(values, i, period)?;
            let weighted: f64 = window
                .iter()
                .enumerate()
                .map(|(k, v)| (k + 1) as f64 * v)
                .sum();
            Some(weighted / divisor)
        })
        .collect()
}

/// round(sqrt(period)), the final smoothing length of a Hull average.
pub fn hull_smoothing_period(period: usize) -> usize {
    ((period as f64).sqrt().round() as usize).max(1)
}

/// Hull moving average: WMA(2*WMA(n/2) - WMA(n), round(sqrt(n))).
///
/// Hull(144) is the WMA(72) / WMA(144) / WMA(12) chain.
pub fn calculate_hull(values: &[Option<f64>], period: usize) -> IndicatorSeries {
    if period < 2 {
        return IndicatorSeries::undefined(IndicatorType::Hull(period), values.len());
    }
    let half = wma_values(values, period / 2);
    let full = wma_values(values, period);
    let diff = combine(&half, &full, |h, f| 2.0 * h - f);
    IndicatorSeries::new(
        IndicatorType::Hull(period),
        wma_values(&diff, hull_smoothing_period(period)),
    )
}

/// WMA of a WMA: the chained Hull approximation, WMA(WMA(x, inner), outer).
pub fn calculate_wma_chain(values: &[Option<f64>], inner: usize, outer: usize) -> IndicatorSeries {
    let first = wma_values(values, inner);
    IndicatorSeries::new(
        IndicatorType::WmaChain { inner, outer },
        wma_values(&first, outer),
    )
}
