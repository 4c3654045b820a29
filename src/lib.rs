pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod stats;

pub use error::{AnalyticsError, Result};
