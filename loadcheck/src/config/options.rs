//! Scenario, endpoint and HTTP configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::profile::LoadProfile;
use super::thresholds::Threshold;
use crate::errors::ConfigError;

/// Environment variable holding the product service base URL.
pub const PRODUCT_SERVICE_URL_ENV: &str = "PRODUCT_SERVICE_URL";
/// Environment variable holding the order service base URL.
pub const ORDER_SERVICE_URL_ENV: &str = "ORDER_SERVICE_URL";

/// Base URLs of the services under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    /// Product catalog base URL.
    #[serde(default = "default_product_url")]
    pub product: String,
    /// Order service base URL.
    #[serde(default = "default_order_url")]
    pub order: String,
}

fn default_product_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_order_url() -> String {
    "http://localhost:8082".to_string()
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            product: default_product_url(),
            order: default_order_url(),
        }
    }
}

impl ServiceEndpoints {
    /// Reads endpoints from the environment, falling back to localhost defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads endpoints through an arbitrary lookup (testable `from_env`).
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |key: &str, default: fn() -> String| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(default)
        };
        Self {
            product: pick(PRODUCT_SERVICE_URL_ENV, default_product_url),
            order: pick(ORDER_SERVICE_URL_ENV, default_order_url),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> f64 {
    60.0
}

fn default_user_agent() -> String {
    concat!("loadcheck/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// Gets timeout as Duration; non-finite or out-of-range values are rejected.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.timeout_seconds.max(0.0))
            .map_err(|_| ConfigError::InvalidDuration(format!("{}s", self.timeout_seconds)))
    }
}

/// Everything the workload driver needs to run one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOptions {
    /// VU/duration shape.
    #[serde(flatten)]
    pub profile: LoadProfile,
    /// Thresholds keyed by metric name.
    #[serde(default)]
    pub thresholds: BTreeMap<String, Vec<Threshold>>,
    /// Where to write the summary report, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl ScenarioOptions {
    /// Creates options with no thresholds and no report.
    #[must_use]
    pub fn new(profile: LoadProfile) -> Self {
        Self {
            profile,
            thresholds: BTreeMap::new(),
            report_path: None,
        }
    }

    /// Adds a threshold expression for a metric.
    pub fn with_threshold(
        mut self,
        metric: impl Into<String>,
        expression: &str,
    ) -> Result<Self, ConfigError> {
        let threshold: Threshold = expression.parse()?;
        self.thresholds.entry(metric.into()).or_default().push(threshold);
        Ok(self)
    }

    /// Sets the report output path.
    #[must_use]
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Validates the profile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.profile.validate()
    }
}
