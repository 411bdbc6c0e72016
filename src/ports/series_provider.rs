//! Series access port trait.

use crate::domain::error::ScanError;
use crate::domain::series::Series;
use chrono::NaiveDate;

/// Source of daily series. Shared across scan workers, hence `Send + Sync`.
pub trait SeriesProvider: Send + Sync {
    /// Full validated history for `id`: `NotFound` when there is none,
    /// `MalformedSeries` when it cannot be parsed or validated.
    fn load(&self, id: &str) -> Result<Series, ScanError>;

    /// Every instrument the provider can serve, sorted.
    fn list_instruments(&self) -> Result<Vec<String>, ScanError>;

    /// First date, last date and bar count, or `None` when `id` is unknown.
    fn data_range(&self, id: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ScanError>;
}
