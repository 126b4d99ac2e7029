//! Configuration for load runs.
//!
//! This module provides:
//! - Service endpoints (from the environment)
//! - Load profiles (fixed, iteration-bounded, ramping)
//! - Threshold expressions
//! - Duration string parsing

mod duration;
mod options;
mod profile;
mod thresholds;

pub use duration::{format_duration, parse_duration, serde_duration};
pub use options::{
    HttpConfig, ScenarioOptions, ServiceEndpoints, ORDER_SERVICE_URL_ENV,
    PRODUCT_SERVICE_URL_ENV,
};
pub use profile::{LoadProfile, StageTarget};
pub use thresholds::{Aggregate, Comparison, Threshold};
