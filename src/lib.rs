//! timelens: time-tracking analytics for issue trackers.
//!
//! This crate turns two collections exported from an issue tracker, Issues
//! and Timelogs, into a dashboard of derived metrics: hours per category,
//! per user and per week, a daily activity heatmap, sprint velocity,
//! collaboration pairs, team size and issue complexity per category,
//! productivity histograms and estimate deviation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use chrono::{Local, Utc};
//! use timelens::analytics::{MetricsEngine, Report};
//! use timelens::model::SnapshotLoader;
//!
//! fn main() -> timelens::Result<()> {
//!     let snapshot = SnapshotLoader::new()
//!         .load_files(Path::new("issues.json"), Path::new("timelogs.json"))?;
//!
//!     let engine = MetricsEngine::default();
//!     match engine.compute(&snapshot, &Utc, Local::now().date_naive()) {
//!         Report::NoData => println!("No timelogs"),
//!         Report::Ready(dashboard) => {
//!             for (category, hours) in &dashboard.category_totals {
//!                 println!("{category}: {hours:.2}h");
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`model`]: Issue and Timelog records and the snapshot loader
//! - [`analytics`]: The metrics engine and its aggregators
//! - [`render`]: Plain text report rendering
//! - [`config`]: Configuration management
//! - [`cli`]: Command-line interface
//! - [`error`]: Error types and handling
//! - [`util`]: Small shared helpers

#![forbid(unsafe_code)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analytics;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{Result, TimelensError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analytics::{Dashboard, MetricsEngine, Report};
    pub use crate::config::Config;
    pub use crate::error::{Result, TimelensError};
    pub use crate::model::{Issue, Snapshot, SnapshotLoader, Timelog};
}
