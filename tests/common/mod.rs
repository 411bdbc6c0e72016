#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use trendscan::domain::error::ScanError;
pub use trendscan::domain::series::{PriceBar, Series};
use trendscan::ports::series_provider::SeriesProvider;

pub enum MockFailure {
    NotFound,
    Malformed(String),
}

pub struct MockSeriesProvider {
    pub series: HashMap<String, Series>,
    pub errors: HashMap<String, MockFailure>,
    pub listing_error: Option<String>,
}

impl MockSeriesProvider {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            errors: HashMap::new(),
            listing_error: None,
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.insert(series.instrument_id().to_string(), series);
        self
    }

    pub fn with_error(mut self, id: &str, failure: MockFailure) -> Self {
        self.errors.insert(id.to_string(), failure);
        self
    }

    pub fn with_listing_error(mut self, reason: &str) -> Self {
        self.listing_error = Some(reason.to_string());
        self
    }
}

impl SeriesProvider for MockSeriesProvider {
    fn load(&self, id: &str) -> Result<Series, ScanError> {
        match self.errors.get(id) {
            Some(MockFailure::NotFound) => {
                return Err(ScanError::NotFound {
                    instrument: id.to_string(),
                })
            }
            Some(MockFailure::Malformed(reason)) => return Err(ScanError::malformed(id, reason.clone())),
            None => {}
        }
        self.series.get(id).cloned().ok_or_else(|| ScanError::NotFound {
            instrument: id.to_string(),
        })
    }

    fn list_instruments(&self) -> Result<Vec<String>, ScanError> {
        if let Some(reason) = &self.listing_error {
            return Err(ScanError::Provider {
                reason: reason.clone(),
            });
        }
        let mut ids: Vec<String> = self
            .series
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn data_range(&self, id: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ScanError> {
        Ok(self.series.get(id).and_then(|s| {
            s.date_range().map(|(first, last)| (first, last, s.len()))
        }))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars from 2020-01-01; open, high and low equal the close.
pub fn make_series(id: &str, closes: &[f64]) -> Series {
    let start = date(2020, 1, 1);
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10_000.0,
        })
        .collect();
    Series::new(id, bars).unwrap()
}

pub fn flat_closes(n: usize) -> Vec<f64> {
    vec![100.0; n]
}

/// 1% compounding daily rise.
pub fn rising_closes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 * 1.01_f64.powi(i as i32)).collect()
}

/// 70 bars down from 200, then 130 bars up.
pub fn v_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..70).map(|i| 200.0 - i as f64).collect();
    closes.extend((1..=130).map(|i| 131.0 + i as f64));
    closes
}

/// 150 bars falling one point a day from 300, then 150 bars rising one point
/// a day. The trough is bar 149.
pub fn long_v_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..150).map(|i| 300.0 - i as f64).collect();
    closes.extend((1..=150).map(|i| 151.0 + i as f64));
    closes
}

/// Slow uptrend with a sine swing; produces trades for most strategies.
pub fn swing_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 20.0 * (i as f64 / 15.0).sin() + i as f64 * 0.05)
        .collect()
}

/// Write `<dir>/<id>.csv` with a standard header.
pub fn write_csv(dir: &std::path::Path, id: &str, closes: &[f64]) {
    let start = date(2020, 1, 1);
    let mut content = String::from("Date,Open,High,Low,Close,Volume\n");
    for (i, close) in closes.iter().enumerate() {
        let d = start + chrono::Duration::days(i as i64);
        content.push_str(&format!("{d},{close},{close},{close},{close},10000\n"));
    }
    std::fs::write(dir.join(format!("{id}.csv")), content).unwrap();
}
