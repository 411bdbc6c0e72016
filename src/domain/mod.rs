//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod position;
pub mod scanner;
pub mod series;
pub mod strategy;
pub mod trend;
pub mod universe;
