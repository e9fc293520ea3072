//! Ingestion and export for the correlation analysis.
//!
//! This crate provides:
//! - Record models for daily case counts and daily OHLC prices
//! - CSV readers that filter rows to an analysis window
//! - A CSV writer for computed lag profiles

pub mod csv_storage;
pub mod models;

pub use csv_storage::CsvStorage;
pub use models::{CaseRecord, LagRow, PriceRecord};
