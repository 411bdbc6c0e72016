//! Average True Range with Wilder smoothing.
//!
//! TR[0] = high - low; afterwards TR uses the previous close. Seeded with the
//! mean of the first n true ranges, then ATR = (ATR*(n-1) + TR) / n.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::series::Series;

pub fn calculate_atr(series: &Series, period: usize) -> IndicatorSeries {
    let bars = series.bars();
    if bars.len() < period || period == 0 {
        return IndicatorSeries::undefined(IndicatorType::Atr(period), bars.len());
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let n = period as f64;
    let mut values = vec![None; bars.len()];
    let mut atr = tr_values[..period].iter().sum::<f64>() / n;
    values[period - 1] = Some(atr);
    for i in period..bars.len() {
        atr = (atr * (n - 1.0) + tr_values[i]) / n;
        values[i] = Some(atr);
    }

    IndicatorSeries::new(IndicatorType::Atr(period), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::PriceBar;
    use chrono::NaiveDate;

    fn make_series(rows: &[(f64, f64, f64)]) -> Series {
        let bars = rows
            .iter()
            .enumerate()
            .map(|(i, &(high, low, close))| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect();
        Series::new("TEST", bars).unwrap()
    }

    #[test]
    fn atr_basic() {
        let series = calculate_atr(&make_series(&[(110.0, 90.0, 100.0); 5]), 3);
        assert_eq!(series.len(), 5);
        assert!(series.get(1).is_none());
        assert!(series.get(2).is_some());
        assert!((series.get(4).unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn atr_seed_is_average() {
        let bars = make_series(&[
            (110.0, 100.0, 105.0),
            (115.0, 105.0, 110.0),
            (120.0, 110.0, 115.0),
        ]);
        let series = calculate_atr(&bars, 3);
        assert!((series.get(2).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let bars = make_series(&[
            (110.0, 100.0, 105.0),
            (115.0, 105.0, 110.0),
            (120.0, 110.0, 115.0),
            (130.0, 115.0, 120.0),
        ]);
        let series = calculate_atr(&bars, 3);
        let expected = (10.0 * 2.0 + 15.0) / 3.0;
        assert!((series.get(3).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn atr_gap_uses_previous_close() {
        let bars = make_series(&[(110.0, 100.0, 105.0), (130.0, 120.0, 125.0)]);
        let series = calculate_atr(&bars, 2);
        // TR0 = 10, TR1 = |130 - 105| = 25
        assert!((series.get(1).unwrap() - 17.5).abs() < 1e-9);
    }

    #[test]
    fn atr_insufficient_bars() {
        let series = calculate_atr(&make_series(&[(110.0, 90.0, 100.0); 2]), 5);
        assert_eq!(series.values, vec![None, None]);
    }

    #[test]
    fn atr_zero_on_rangeless_flat_series() {
        let series = calculate_atr(&make_series(&[(50.0, 50.0, 50.0); 20]), 14);
        assert_eq!(series.get(19), Some(0.0));
    }
}
