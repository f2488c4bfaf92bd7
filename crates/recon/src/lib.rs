//! `worksync-recon` — attendance workbook / travel log reconciliation engine.
//!
//! Pure engine crate: receives a pre-loaded workbook and travel entries,
//! returns per-day records. No CLI or IO dependencies.

pub mod columns;
pub mod config;
pub mod dates;
pub mod day;
pub mod engine;
pub mod error;
pub mod locate;
pub mod model;
pub mod summary;
pub mod travel;

pub use config::SyncConfig;
pub use engine::{inspect, run};
pub use error::ReconError;
pub use model::{DayRecord, SyncInput, SyncResult, Workbook};
pub use travel::TravelIndex;
