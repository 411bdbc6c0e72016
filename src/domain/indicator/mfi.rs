//! Money Flow Index and the RSI/MFI momentum blend.
//!
//! Typical price tp = (H+L+C)/3, raw flow = tp * volume. Flow is positive
//! when tp rises against the previous bar and negative when it falls;
//! unchanged bars contribute to neither side. Without range or volume
//! columns the MFI degrades to the simple RSI of the closes.

use crate::domain::indicator::rsi::{calculate_rsi, strength_index};
use crate::domain::indicator::{combine, IndicatorSeries, IndicatorType, RsiSmoothing};
use crate::domain::series::Series;

pub fn calculate_mfi(series: &Series, period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Mfi(period);
    if period == 0 {
        return IndicatorSeries::undefined(indicator_type, series.len());
    }
    if !series.has_range() || !series.has_volume() {
        let rsi = calculate_rsi(&series.closes(), period, RsiSmoothing::Simple);
        return IndicatorSeries::new(indicator_type, rsi.values);
    }

    let bars = series.bars();
    let typical: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();

    let values = (0..bars.len())
        .map(|i| {
            if i < period {
                return None;
            }
            let mut positive = 0.0;
            let mut negative = 0.0;
            for j in i + 1 - period..=i {
                let flow = typical[j] * bars[j].volume;
                if typical[j] > typical[j - 1] {
                    positive += flow;
                } else if typical[j] < typical[j - 1] {
                    negative += flow;
                }
            }
            Some(strength_index(positive, negative))
        })
        .collect();

    IndicatorSeries::new(indicator_type, values)
}

/// (RSI + MFI) / 2, the momentum reading the TREF and RUA strategies trade on.
pub fn calculate_momentum_blend(
    series: &Series,
    period: usize,
    smoothing: RsiSmoothing,
) -> IndicatorSeries {
    let rsi = calculate_rsi(&series.closes(), period, smoothing);
    let mfi = calculate_mfi(series, period);
    IndicatorSeries::new(
        IndicatorType::MomentumBlend { period, smoothing },
        combine(&rsi.values, &mfi.values, |r, m| (r + m) / 2.0),
    )
}
