//! Observability utilities.
//!
//! Log output goes to stderr so reports and JSON summaries on stdout stay clean.

mod logging;

pub use logging::{init_tracing, DEFAULT_LOG_FILTER};
