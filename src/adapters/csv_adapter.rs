//! CSV directory series adapter.
//!
//! One file per instrument, `<dir>/<ID>.csv`. Header names vary between data
//! vendors, so each field accepts a handful of aliases; everything past this
//! module sees a plain [`Series`].

use crate::domain::error::ScanError;
use crate::domain::series::{PriceBar, Series};
use crate::ports::config_port::ConfigPort;
use crate::ports::series_provider::SeriesProvider;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const DATE_ALIASES: &[&str] = &["DATE", "TARIH", "TARİH"];
const OPEN_ALIASES: &[&str] = &["OPEN", "OPEN_TL"];
const HIGH_ALIASES: &[&str] = &["HIGH", "HIGH_TL"];
const LOW_ALIASES: &[&str] = &["LOW", "LOW_TL"];
const CLOSE_ALIASES: &[&str] = &["CLOSE", "CLOSING_TL", "KAPANIS"];
const VOLUME_ALIASES: &[&str] = &["VOLUME", "VOLUME_TL", "VOL", "HACIM"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d-%m-%Y", "%d/%m/%Y"];

pub struct CsvSeriesAdapter {
    base_path: PathBuf,
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn resolve(id: &str, headers: &csv::StringRecord) -> Result<Self, ScanError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_uppercase())
            .collect();
        let find = |aliases: &[&str]| {
            normalized
                .iter()
                .position(|h| aliases.iter().any(|a| a == h))
        };

        let date = find(DATE_ALIASES).ok_or_else(|| ScanError::malformed(id, "no date column"))?;
        let close =
            find(CLOSE_ALIASES).ok_or_else(|| ScanError::malformed(id, "no close column"))?;
        let (high, low) = match (find(HIGH_ALIASES), find(LOW_ALIASES)) {
            (Some(h), Some(l)) => (Some(h), Some(l)),
            _ => (None, None),
        };

        Ok(Self {
            date,
            close,
            open: find(OPEN_ALIASES),
            high,
            low,
            volume: find(VOLUME_ALIASES),
        })
    }
}

impl CsvSeriesAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory from `[data] dir`.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScanError> {
        match config.get_string("data", "dir") {
            Some(dir) if !dir.trim().is_empty() => Ok(Self::new(dir.trim())),
            _ => Err(ScanError::ConfigMissing {
                section: "data".into(),
                key: "dir".into(),
            }),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// `<ID>.csv`, falling back to a case-insensitive match on the file stem.
    fn csv_path(&self, id: &str) -> Option<PathBuf> {
        let exact = self.base_path.join(format!("{id}.csv"));
        if exact.is_file() {
            return Some(exact);
        }
        fs::read_dir(&self.base_path)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| csv_stem(path).is_some_and(|stem| stem.eq_ignore_ascii_case(id)))
    }

    fn parse(&self, id: &str, path: &Path) -> Result<Series, ScanError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ScanError::malformed(id, format!("failed to read {}: {e}", path.display())))?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| ScanError::malformed(id, format!("bad header: {e}")))?
            .clone();
        let columns = Columns::resolve(id, &headers)?;

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record =
                result.map_err(|e| ScanError::malformed(id, format!("row {}: {e}", row + 1)))?;
            if let Some(bar) = parse_row(&record, &columns)
                .map_err(|reason| ScanError::malformed(id, format!("row {}: {reason}", row + 1)))?
            {
                bars.push(bar);
            }
        }

        if bars.is_empty() {
            return Err(ScanError::NotFound {
                instrument: id.to_string(),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(Series::new(id, bars)?.with_columns(columns.high.is_some(), columns.volume.is_some()))
    }
}

fn csv_stem(path: &Path) -> Option<&str> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}

fn field<'a>(record: &'a csv::StringRecord, index: Option<usize>) -> Option<&'a str> {
    index
        .and_then(|i| record.get(i))
        .filter(|value| !value.is_empty())
}

fn parse_number(name: &str, raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("invalid {name} value {raw:?}"))
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// `Ok(None)` for rows without a date or close; they are dropped.
fn parse_row(record: &csv::StringRecord, columns: &Columns) -> Result<Option<PriceBar>, String> {
    let (Some(date_raw), Some(close_raw)) = (
        field(record, Some(columns.date)),
        field(record, Some(columns.close)),
    ) else {
        return Ok(None);
    };

    let date = parse_date(date_raw).ok_or_else(|| format!("invalid date {date_raw:?}"))?;
    let close = parse_number("close", close_raw)?;
    let optional = |name: &str, index: Option<usize>, fallback: f64| -> Result<f64, String> {
        match field(record, index) {
            Some(raw) => parse_number(name, raw),
            None => Ok(fallback),
        }
    };

    Ok(Some(PriceBar {
        date,
        open: optional("open", columns.open, close)?,
        high: optional("high", columns.high, close)?,
        low: optional("low", columns.low, close)?,
        close,
        volume: optional("volume", columns.volume, 0.0)?,
    }))
}

impl SeriesProvider for CsvSeriesAdapter {
    fn load(&self, id: &str) -> Result<Series, ScanError> {
        let path = self.csv_path(id).ok_or_else(|| ScanError::NotFound {
            instrument: id.to_string(),
        })?;
        self.parse(id, &path)
    }

    fn list_instruments(&self) -> Result<Vec<String>, ScanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| ScanError::Provider {
            reason: format!(
                "failed to read directory {}: {e}",
                self.base_path.display()
            ),
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ScanError::Provider {
                reason: format!("directory entry error: {e}"),
            })?;
            if let Some(stem) = csv_stem(&entry.path()) {
                ids.push(stem.to_uppercase());
            }
        }

        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn data_range(&self, id: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ScanError> {
        match self.load(id) {
            Ok(series) => Ok(series
                .date_range()
                .map(|(first, last)| (first, last, series.len()))),
            Err(ScanError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
