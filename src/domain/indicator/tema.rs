//! Triple-smoothed EMA composite: 3*E1 - 3*E2 + E3.
//!
//! E1 = EMA(x), E2 = EMA(E1), E3 = EMA(E2), all on the unmasked recursion.
//! Masked for the first (n-1) outputs like a plain EMA.

use crate::domain::indicator::ema::{ema_raw, mask_warmup};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_tema(values: &[Option<f64>], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::undefined(IndicatorType::Tema(period), values.len());
    }
    let e1 = ema_raw(values, period);
    let e2 = ema_raw(&e1, period);
    let e3 = ema_raw(&e2, period);

    let tema = e1
        .iter()
        .zip(&e2)
        .zip(&e3)
        .map(|((a, b), c)| Some(3.0 * (*a)? - 3.0 * (*b)? + (*c)?))
        .collect();

    IndicatorSeries::new(IndicatorType::Tema(period), mask_warmup(tema, period))
}
