//! Core types for case/market correlation analysis.
//!
//! This crate provides:
//! - The shared analysis calendar (`DateRange`) and dense daily series
//! - Price stream identifiers and daily OHLC bars
//! - The error taxonomy used by every analysis stage
//! - Application configuration and its loader

pub mod calendar;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod series;
pub mod stream;

pub use calendar::DateRange;
pub use config::{AnalysisConfig, AppConfig, SeriesSource, SpikeConfig, ThresholdPolicy};
pub use config_loader::ConfigLoader;
pub use error::{AnalysisError, Result};
pub use series::{DailySeries, RawObservation, SeriesValue};
pub use stream::{PriceBar, PriceStream};
