//! Rolling least-squares fit of value against bar index.
//!
//! The Pearson correlation of the fit is the "trend straightness" score used
//! for ranking and for gating entries.

use crate::domain::indicator::{defined_window, IndicatorSeries, IndicatorType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinRegFit {
    pub slope: f64,
    pub intercept: f64,
    /// Fitted value at the most recent index of the window.
    pub fitted: f64,
    /// Pearson r of value vs. index; `None` when the values have no variance.
    pub correlation: Option<f64>,
}

impl LinRegFit {
    /// Value of the fitted line at window position `index`.
    pub fn at(&self, index: usize) -> f64 {
        self.intercept + self.slope * index as f64
    }

    /// Population standard deviation of `window` around the fitted line.
    /// `window` must be the slice the fit was taken from.
    pub fn residual_std(&self, window: &[f64]) -> f64 {
        if window.is_empty() {
            return 0.0;
        }
        let n = window.len() as f64;
        let sum_sq: f64 = window
            .iter()
            .enumerate()
            .map(|(i, y)| (y - self.at(i)).powi(2))
            .sum();
        (sum_sq / n).sqrt()
    }
}

/// Fit y = intercept + slope * x for x = 0..len.
pub fn fit(window: &[f64]) -> Option<LinRegFit> {
    let len = window.len();
    if len < 2 {
        return None;
    }
    let n = len as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = window.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (i, y) in window.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = y - y_mean;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let correlation = (syy > 0.0).then(|| (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0));

    Some(LinRegFit {
        slope,
        intercept,
        fitted: intercept + slope * (n - 1.0),
        correlation,
    })
}

/// Fit over the trailing `window` values at every index.
pub fn calculate_linreg(values: &[Option<f64>], window: usize) -> Vec<Option<LinRegFit>> {
    (0..values.len())
        .map(|i| fit(&defined_window(values, i, window)?))
        .collect()
}

/// Rolling Pearson r of value vs. index.
pub fn calculate_trend_correlation(values: &[Option<f64>], window: usize) -> IndicatorSeries {
    IndicatorSeries::new(
        IndicatorType::LinReg(window),
        calculate_linreg(values, window)
            .into_iter()
            .map(|f| f.and_then(|f| f.correlation))
            .collect(),
    )
}
