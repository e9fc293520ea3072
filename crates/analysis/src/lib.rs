//! Orchestration of the case/price correlation analysis.
//!
//! This crate provides:
//! - `SeriesStore`: the immutable aligned series for every region and instrument
//! - Loading of a store from configured CSV sources
//! - `SeriesManager`: global (lag sweep), local (spike matching), and
//!   windowed statistics over the store
//! - Per-pair summary reports

pub mod loader;
pub mod manager;
pub mod report;
pub mod store;

pub use loader::{load_instrument, load_region, load_store};
pub use manager::{ManagerSettings, SeriesManager};
pub use report::{pair_reports, LagPoint, LocalSummary, PairReport, ReportRequest};
pub use store::{SeriesStore, SeriesStoreBuilder};
