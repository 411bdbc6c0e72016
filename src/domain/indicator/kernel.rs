//! Rational-quadratic kernel estimate (Nadaraya-Watson style).
//!
//! estimate[t] = sum(w(i) * x[t-i]) / sum(w(i)) for i in 0..=x0, with
//! w(i) = (1 + i^2 / (2 * h^2 * r))^(-r). The current bar is i = 0.

use crate::domain::indicator::{to_x100, IndicatorSeries, IndicatorType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    pub bandwidth: f64,
    pub r: f64,
    pub window: usize,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            bandwidth: 8.0,
            r: 8.0,
            window: 25,
        }
    }
}

impl KernelParams {
    pub fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Kernel {
            bandwidth_x100: to_x100(self.bandwidth),
            r_x100: to_x100(self.r),
            window: self.window,
        }
    }

    fn weights(&self) -> Vec<f64> {
        let denom = 2.0 * self.bandwidth * self.bandwidth * self.r;
        (0..=self.window)
            .map(|i| {
                let i = i as f64;
                (1.0 + i * i / denom).powf(-self.r)
            })
            .collect()
    }
}

pub fn calculate_kernel(values: &[Option<f64>], params: KernelParams) -> IndicatorSeries {
    let indicator_type = params.indicator_type();
    if params.bandwidth <= 0.0 || params.r <= 0.0 {
        return IndicatorSeries::undefined(indicator_type, values.len());
    }
    let weights = params.weights();
    let total: f64 = weights.iter().sum();

    let out = (0..values.len())
        .map(|t| {
            if t < params.window {
                return None;
            }
            let mut acc = 0.0;
            for (i, w) in weights.iter().enumerate() {
                acc += w * values[t - i]?;
            }
            Some(acc / total)
        })
        .collect();

    IndicatorSeries::new(indicator_type, out)
}
