//! End-of-run summary and threshold evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

use super::metrics::{CheckResult, MetricsSnapshot};
use crate::config::Threshold;

/// Outcome of one threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    /// Metric the threshold applies to.
    pub metric: String,
    /// Expression as written, e.g. `p(95)<500`.
    pub expression: String,
    /// Statistic read from the metric; `None` if the metric has no such statistic.
    pub observed: Option<f64>,
    /// Whether it held.
    pub passed: bool,
}

impl ThresholdResult {
    /// Evaluates one threshold against a snapshot.
    ///
    /// A metric that never received samples is read as zero.
    #[must_use]
    pub fn evaluate(metric: &str, threshold: &Threshold, snapshot: &MetricsSnapshot) -> Self {
        let observed = match snapshot.get(metric) {
            Some(value) => value.stat(threshold.aggregate),
            None => Some(0.0),
        };

        let passed = observed.is_some_and(|v| threshold.is_satisfied_by(v));
        if observed.is_none() {
            tracing::warn!(
                metric,
                threshold = threshold.expression(),
                "Threshold aggregate does not apply to metric"
            );
        }

        Self {
            metric: metric.to_string(),
            expression: threshold.expression().to_string(),
            observed,
            passed,
        }
    }
}

/// Result of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Unique run id.
    pub run_id: Uuid,
    /// Scenario name.
    pub scenario: String,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end.
    pub finished_at: DateTime<Utc>,
    /// Aggregated metrics and checks.
    pub metrics: MetricsSnapshot,
    /// Threshold outcomes, ordered by metric.
    pub thresholds: Vec<ThresholdResult>,
    /// Why the run stopped early, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<String>,
}

impl Summary {
    /// Builds a summary, evaluating every threshold against `metrics`.
    #[must_use]
    pub fn new(
        scenario: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        metrics: MetricsSnapshot,
        thresholds: &BTreeMap<String, Vec<Threshold>>,
    ) -> Self {
        let thresholds = thresholds
            .iter()
            .flat_map(|(metric, list)| {
                list.iter()
                    .map(|t| ThresholdResult::evaluate(metric, t, &metrics))
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            scenario: scenario.into(),
            started_at,
            finished_at,
            metrics,
            thresholds,
            interrupted: None,
        }
    }

    /// Marks the run as stopped early.
    #[must_use]
    pub fn with_interrupted(mut self, reason: impl Into<String>) -> Self {
        self.interrupted = Some(reason.into());
        self
    }

    /// Whether every threshold held.
    #[must_use]
    pub fn thresholds_passed(&self) -> bool {
        self.thresholds.iter().all(|t| t.passed)
    }

    /// Whether every check passed every time.
    #[must_use]
    pub fn checks_passed(&self) -> bool {
        self.metrics.checks.iter().all(CheckResult::all_passed)
    }

    /// Overall verdict: thresholds and checks all passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.thresholds_passed() && self.checks_passed()
    }

    /// Thresholds that did not hold.
    pub fn failed_thresholds(&self) -> impl Iterator<Item = &ThresholdResult> {
        self.thresholds.iter().filter(|t| !t.passed)
    }

    /// Run length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at).to_std().unwrap_or_default()
    }
}
