//! Scenario trait and the built-in scenario catalogue.
//!
//! Each scenario pairs a load profile and thresholds with the requests one
//! virtual user makes per iteration.

mod contract;
mod load;
mod traffic;

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ScenarioOptions;
use crate::contracts::SchemaStore;
use crate::driver::IterationContext;
use crate::errors::{ConfigError, LoadcheckError};

pub use contract::ContractScenario;
pub use load::{LoadScenario, STOCK_OUT_COUNTER};
pub use traffic::{
    BenchmarkScenario, FaultInjectionScenario, SmokeScenario, SoakScenario, SpikeScenario,
    StressScenario,
};

/// Directory reports are written to by default.
pub const REPORT_DIR: &str = "tests/load/reports";

/// Names of the built-in scenarios.
pub const SCENARIO_NAMES: &[&str] = &[
    "smoke",
    "load",
    "stress",
    "spike",
    "soak",
    "benchmark",
    "fault_injection",
    "contract",
];

/// A load scenario.
///
/// `iteration` is what one virtual user does per loop; the driver calls it
/// repeatedly according to [`Scenario::options`].
#[async_trait]
pub trait Scenario: Send + Sync + Debug {
    /// Returns the name of the scenario.
    fn name(&self) -> &str;

    /// Profile, thresholds and report location.
    fn options(&self) -> ScenarioOptions;

    /// Runs one iteration.
    async fn iteration(&self, ctx: &IterationContext) -> Result<(), LoadcheckError>;
}

/// Looks up a built-in scenario.
///
/// `contract` uses `store` when given, otherwise it downloads the Swagger
/// document from the order service on its first iteration.
pub fn scenario_by_name(
    name: &str,
    store: Option<Arc<SchemaStore>>,
) -> Result<Arc<dyn Scenario>, ConfigError> {
    let scenario: Arc<dyn Scenario> = match name {
        "smoke" => Arc::new(SmokeScenario),
        "load" => Arc::new(LoadScenario),
        "stress" => Arc::new(StressScenario),
        "spike" => Arc::new(SpikeScenario),
        "soak" => Arc::new(SoakScenario),
        "benchmark" => Arc::new(BenchmarkScenario),
        "fault_injection" | "fault" => Arc::new(FaultInjectionScenario),
        "contract" => Arc::new(match store {
            Some(store) => ContractScenario::new(store),
            None => ContractScenario::fetching(),
        }),
        other => return Err(ConfigError::UnknownScenario(other.to_string())),
    };
    Ok(scenario)
}

/// Default report path for a report stem, e.g. `smoke` -> `tests/load/reports/smoke_report.html`.
#[must_use]
pub fn report_path(stem: &str) -> PathBuf {
    PathBuf::from(REPORT_DIR).join(format!("{stem}_report.html"))
}

/// Picks a random element.
pub(crate) fn pick(items: &[Value]) -> Option<&Value> {
    if items.is_empty() {
        return None;
    }
    let index = rand::thread_rng().gen_range(0..items.len());
    items.get(index)
}

/// Reads the numeric `id` of a response item.
pub(crate) fn id_of(item: &Value) -> Option<i64> {
    item.get("id").and_then(Value::as_i64)
}
