//! Sleepscope - Data-shaping core for a sleep and late-night behavior dashboard
//!
//! Sleepscope turns four CSV datasets into renderer-ready chart geometry through a
//! deterministic pipeline: loading → normalization → filtering → aggregation
//! → scale/encoding → frame encoding.
//!
//! ## Modules
//!
//! - **Data**: typed records, the normalizer and the all-or-nothing loader
//! - **Analysis**: filter engine, aggregator, scales and radial layouts
//! - **Interaction**: dashboard state, focus broadcasting, resize debouncing
//! - **Charts**: per-page chart builders and the stateful [`Dashboard`] session

pub mod aggregate;
pub mod charts;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod radial;
pub mod scale;
pub mod selection;
pub mod state;
pub mod types;

pub use charts::{render_page, PageCharts, Viewport};
pub use config::DashboardConfig;
pub use error::DashboardError;
pub use loader::{load_datasets, DatasetPaths};
pub use pipeline::{render_json, Dashboard, Frame};
pub use state::{DashboardEvent, DashboardState, Page};
pub use types::Datasets;

/// Sleepscope version embedded in every frame
pub const SLEEPSCOPE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for frames
pub const PRODUCER_NAME: &str = "sleepscope";
