//! Exponential Moving Average.
//!
//! k = 2/(n+1). Seeded with the first defined input, then
//! EMA[i] = EMA[i-1] + k * (x[i] - EMA[i-1]).
//! The first (n-1) outputs after the seed are masked as undefined.

use crate::domain::indicator::{first_defined, IndicatorSeries, IndicatorType};

pub fn calculate_ema(values: &[Option<f64>], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::undefined(IndicatorType::Ema(period), values.len());
    }
    let raw = ema_raw(values, period);
    IndicatorSeries::new(IndicatorType::Ema(period), mask_warmup(raw, period))
}

/// Unmasked recursion, defined from the first defined input onwards.
///
/// Composite smoothers (TEMA) feed this back into itself and mask only the
/// final result.
pub fn ema_raw(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;

    values
        .iter()
        .map(|value| {
            let x = (*value)?;
            let next = match ema {
                None => x,
                Some(prev) => prev + k * (x - prev),
            };
            ema = Some(next);
            Some(next)
        })
        .collect()
}

/// Undefine the first `period - 1` outputs after the first defined one.
pub(crate) fn mask_warmup(mut values: Vec<Option<f64>>, period: usize) -> Vec<Option<f64>> {
    if let Some(first) = first_defined(&values) {
        let end = (first + period.saturating_sub(1)).min(values.len());
        for v in &mut values[first..end] {
            *v = None;
        }
    }
    values
}
