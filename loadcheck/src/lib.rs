//! # Loadcheck
//!
//! Load and contract testing harness for the product and order services.
//!
//! Loadcheck provides:
//!
//! - **Contract validation**: check JSON response bodies against the named
//!   definitions of a Swagger/OpenAPI document
//! - **Workload driving**: run scenarios across virtual users with fixed,
//!   iteration-bounded or ramping load profiles
//! - **Thresholds and checks**: k6-style pass/fail criteria evaluated over
//!   collected metrics
//! - **Reports**: text, HTML and JSON run summaries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use loadcheck::prelude::*;
//!
//! let store = SchemaStore::from_path("docs/swagger.json")?;
//! let result = validate(&body, "domain.Product", &store);
//! assert!(result.is_valid(), "{}", result);
//!
//! let transport = Arc::new(ReqwestTransport::new(&HttpConfig::default())?);
//! let driver = WorkloadDriver::new(ApiClient::new(transport, ServiceEndpoints::from_env()));
//! let summary = driver.run_scenario(scenario_by_name("smoke", None)?).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod client;
pub mod config;
pub mod contracts;
pub mod driver;
pub mod errors;
pub mod observability;
pub mod report;
pub mod scenarios;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{
        ApiClient, ApiResponse, HttpRequest, HttpTransport, NewOrder, NewProduct,
        ReqwestTransport,
    };
    pub use crate::config::{
        HttpConfig, LoadProfile, ScenarioOptions, ServiceEndpoints, StageTarget, Threshold,
    };
    pub use crate::contracts::{
        validate, ContractValidator, SchemaStore, ValidationResult, ValidatorConfig, Violation,
        ViolationKind,
    };
    pub use crate::driver::{
        metric_names, CancellationToken, IterationContext, Metrics, Summary, WorkloadDriver,
    };
    pub use crate::errors::{ConfigError, LoadcheckError, Result};
    pub use crate::report::{render_html, render_text, write_report};
    pub use crate::scenarios::{scenario_by_name, Scenario, SCENARIO_NAMES};
}
