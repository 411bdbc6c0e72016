//! Signals, the single open position, and the trades it produces.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Buy,
    Sell,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub index: usize,
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionStatus {
    #[default]
    Flat,
    InPosition,
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionStatus::Flat => write!(f, "FLAT"),
            PositionStatus::InPosition => write!(f, "IN_POSITION"),
        }
    }
}

/// The one long unit a strategy may hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl Position {
    pub fn open(signal: &Signal) -> Self {
        Self {
            entry_index: signal.index,
            entry_date: signal.date,
            entry_price: signal.price,
        }
    }

    pub fn pnl_percent(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * 100.0
    }

    /// Realize the position at `date` / `price`.
    pub fn close(&self, date: NaiveDate, price: f64) -> Trade {
        Trade {
            entry_index: self.entry_index,
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_date: Some(date),
            exit_price: price,
            pnl_percent: self.pnl_percent(price),
        }
    }

    /// Value the position at `price` without closing it.
    pub fn mark(&self, price: f64) -> Trade {
        Trade {
            entry_index: self.entry_index,
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_date: None,
            exit_price: price,
            pnl_percent: self.pnl_percent(price),
        }
    }
}

/// A round trip; `exit_date == None` marks an open trade valued at the last close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: f64,
    pub pnl_percent: f64,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.exit_date.is_none()
    }

    /// Calendar days held; open trades count up to `as_of`.
    pub fn holding_days(&self, as_of: NaiveDate) -> i64 {
        (self.exit_date.unwrap_or(as_of) - self.entry_date).num_days()
    }
}
