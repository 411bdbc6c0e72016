//! Rolling highest value, the top edge of a price channel.

use crate::domain::indicator::{defined_window, IndicatorSeries, IndicatorType};

pub fn calculate_rolling_high(values: &[Option<f64>], window: usize) -> IndicatorSeries {
    let out = (0..values.len())
        .map(|i| {
            defined_window(values, i, window)?
                .into_iter()
                .reduce(f64::max)
        })
        .collect();
    IndicatorSeries::new(IndicatorType::RollingHigh(window), out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_high_window() {
        let input = [Some(3.0), Some(1.0), Some(4.0), Some(1.0), Some(5.0), Some(2.0)];
        let series = calculate_rolling_high(&input, 3);
        assert_eq!(
            series.values,
            vec![None, None, Some(4.0), Some(4.0), Some(5.0), Some(5.0)]
        );
    }

    #[test]
    fn rolling_high_window_1_is_identity() {
        let input = [Some(3.0), Some(1.0)];
        assert_eq!(calculate_rolling_high(&input, 1).values, input.to_vec());
    }

    #[test]
    fn rolling_high_zero_window() {
        let series = calculate_rolling_high(&[Some(1.0)], 0);
        assert_eq!(series.values, vec![None]);
    }
}
