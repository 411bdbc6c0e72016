//! Relative Strength Index, in two smoothing conventions.
//!
//! - Simple: mean gain / mean loss over the trailing n deltas.
//! - Wilder: first average is the simple mean of the first n deltas, then
//!   avg = (prev_avg * (n-1) + current) / n.
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)), clipped to [0, 100].
//! When the loss side is exactly zero the result is 50, gains or not.
//!
//! Warmup: n deltas, so the first n outputs are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, RsiSmoothing};

/// Neutral reading used whenever the loss (or negative flow) side is zero.
pub const NEUTRAL: f64 = 50.0;

pub fn calculate_rsi(
    values: &[Option<f64>],
    period: usize,
    smoothing: RsiSmoothing,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Rsi { period, smoothing };
    if period == 0 {
        return IndicatorSeries::undefined(indicator_type, values.len());
    }

    let deltas: Vec<Option<f64>> = (0..values.len())
        .map(|i| match (i.checked_sub(1).and_then(|p| values[p]), values[i]) {
            (Some(prev), Some(cur)) => Some(cur - prev),
            _ => None,
        })
        .collect();

    let out = match smoothing {
        RsiSmoothing::Simple => simple(&deltas, period),
        RsiSmoothing::Wilder => wilder(&deltas, period),
    };
    IndicatorSeries::new(indicator_type, out)
}

/// Ratio form shared by RSI and MFI.
pub fn strength_index(up: f64, down: f64) -> f64 {
    if down == 0.0 {
        return NEUTRAL;
    }
    (100.0 - 100.0 / (1.0 + up / down)).clamp(0.0, 100.0)
}

fn split(delta: f64) -> (f64, f64) {
    if delta > 0.0 {
        (delta, 0.0)
    } else if delta < 0.0 {
        (0.0, -delta)
    } else {
        (0.0, 0.0)
    }
}

fn simple(deltas: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    (0..deltas.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let mut gains = 0.0;
            let mut losses = 0.0;
            for delta in &deltas[i + 1 - period..=i] {
                let (g, l) = split((*delta)?);
                gains += g;
                losses += l;
            }
            Some(strength_index(gains, losses))
        })
        .collect()
}

fn wilder(deltas: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = period as f64;
    let mut out = Vec::with_capacity(deltas.len());
    let mut run = 0usize;
    let mut seed_gain = 0.0;
    let mut seed_loss = 0.0;
    let mut avg: Option<(f64, f64)> = None;

    for delta in deltas {
        let Some(delta) = *delta else {
            run = 0;
            seed_gain = 0.0;
            seed_loss = 0.0;
            avg = None;
            out.push(None);
            continue;
        };
        let (g, l) = split(delta);
        avg = match avg {
            Some((ag, al)) => Some(((ag * (n - 1.0) + g) / n, (al * (n - 1.0) + l) / n)),
            None => {
                run += 1;
                seed_gain += g;
                seed_loss += l;
                (run == period).then(|| (seed_gain / n, seed_loss / n))
            }
        };
        out.push(avg.map(|(ag, al)| strength_index(ag, al)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lift(prices: &[f64]) -> Vec<Option<f64>> {
        prices.iter().copied().map(Some).collect()
    }

    fn zigzag(n: usize) -> Vec<Option<f64>> {
        (0..n)
            .map(|i| {
                let sign = if i % 3 == 0 { 2.0 } else { -1.0 };
                Some(100.0 + sign * (i % 5) as f64)
            })
            .collect()
    }

    #[test]
    fn rsi_warmup_both_variants() {
        for smoothing in [RsiSmoothing::Simple, RsiSmoothing::Wilder] {
            let series = calculate_rsi(&zigzag(30), 14, smoothing);
            assert_eq!(series.first_defined(), Some(14), "{smoothing:?}");
            assert_eq!(series.len(), 30);
        }
    }

    #[test]
    fn rsi_all_gains_is_neutral() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        for smoothing in [RsiSmoothing::Simple, RsiSmoothing::Wilder] {
            let series = calculate_rsi(&lift(&prices), 14, smoothing);
            for i in 14..20 {
                assert_eq!(series.get(i), Some(50.0));
            }
        }
    }

    #[test]
    fn rsi_flat_is_neutral() {
        let series = calculate_rsi(&lift(&[10.0; 20]), 5, RsiSmoothing::Simple);
        assert_eq!(series.get(19), Some(50.0));
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&lift(&prices), 14, RsiSmoothing::Simple);
        assert_eq!(series.get(19), Some(0.0));
    }

    #[test]
    fn rsi_simple_known_value() {
        // Deltas: +2, -1, +2, -1 over period 4: gains 4, losses 2 -> 100 - 100/3
        let series = calculate_rsi(&lift(&[10.0, 12.0, 11.0, 13.0, 12.0]), 4, RsiSmoothing::Simple);
        let expected = 100.0 - 100.0 / 3.0;
        assert!((series.get(4).unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn rsi_wilder_recursion() {
        let prices = [10.0, 12.0, 11.0, 13.0, 10.0];
        let series = calculate_rsi(&lift(&prices), 3, RsiSmoothing::Wilder);
        // Seed over +2, -1, +2: gain 4/3, loss 1/3
        let (ag, al) = (4.0 / 3.0, 1.0 / 3.0);
        assert!((series.get(3).unwrap() - strength_index(ag, al)).abs() < 1e-10);
        // Next delta -3
        let (ag, al) = (ag * 2.0 / 3.0, (al * 2.0 + 3.0) / 3.0);
        assert!((series.get(4).unwrap() - strength_index(ag, al)).abs() < 1e-10);
    }

    #[test]
    fn rsi_variants_differ() {
        let input = zigzag(60);
        let simple = calculate_rsi(&input, 14, RsiSmoothing::Simple);
        let wilder = calculate_rsi(&input, 14, RsiSmoothing::Wilder);
        assert!((simple.get(59).unwrap() - wilder.get(59).unwrap()).abs() > 1e-6);
    }

    #[test]
    fn rsi_short_input() {
        let series = calculate_rsi(&lift(&[1.0, 2.0, 3.0]), 14, RsiSmoothing::Wilder);
        assert!(series.values.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_period_0() {
        let series = calculate_rsi(&lift(&[1.0, 2.0]), 0, RsiSmoothing::Simple);
        assert_eq!(series.values, vec![None, None]);
    }

    #[test]
    fn strength_index_clips() {
        assert_eq!(strength_index(0.0, 0.0), 50.0);
        assert_eq!(strength_index(5.0, 0.0), 50.0);
        assert_eq!(strength_index(0.0, 5.0), 0.0);
        let v = strength_index(1e300, 1e-300);
        assert!((0.0..=100.0).contains(&v));
    }
}
