//! Daily price bars and validated per-instrument series.

use crate::domain::error::ScanError;
use chrono::NaiveDate;

/// One dated OHLCV observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Bar with open/high/low pinned to the close and no volume.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Ordered, date-unique bars for a single instrument.
///
/// Construction validates the ordering and numeric sanity of every bar, so
/// downstream indicator and strategy code never re-checks it.
#[derive(Debug, Clone)]
pub struct Series {
    instrument_id: String,
    bars: Vec<PriceBar>,
    has_range: bool,
    has_volume: bool,
}

impl Series {
    pub fn new(instrument_id: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, ScanError> {
        let instrument_id = instrument_id.into();
        validate_bars(&instrument_id, &bars)?;
        Ok(Self {
            instrument_id,
            bars,
            has_range: true,
            has_volume: true,
        })
    }

    /// Record which optional columns the provider actually supplied.
    pub fn with_columns(mut self, has_range: bool, has_volume: bool) -> Self {
        self.has_range = has_range;
        self.has_volume = has_volume;
        self
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn has_range(&self) -> bool {
        self.has_range
    }

    pub fn has_volume(&self) -> bool {
        self.has_volume
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Closing prices lifted into indicator input form.
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.bars.iter().map(|b| Some(b.close)).collect()
    }

    pub fn highs(&self) -> Vec<Option<f64>> {
        self.bars.iter().map(|b| Some(b.high)).collect()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

fn validate_bars(instrument: &str, bars: &[PriceBar]) -> Result<(), ScanError> {
    for (i, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(ScanError::malformed(
                instrument,
                format!("non-positive or non-numeric close on {}", bar.date),
            ));
        }
        if !(bar.open.is_finite() && bar.high.is_finite() && bar.low.is_finite()) {
            return Err(ScanError::malformed(
                instrument,
                format!("non-numeric price on {}", bar.date),
            ));
        }
        if !bar.volume.is_finite() || bar.volume < 0.0 {
            return Err(ScanError::malformed(
                instrument,
                format!("invalid volume on {}", bar.date),
            ));
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(ScanError::malformed(
                instrument,
                format!(
                    "dates not strictly increasing: {} follows {}",
                    bar.date,
                    bars[i - 1].date
                ),
            ));
        }
    }
    Ok(())
}
