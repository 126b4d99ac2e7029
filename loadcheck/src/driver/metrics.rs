//! Thread-safe metric registry shared by all virtual users of a run.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::Aggregate;

/// Built-in metric names.
pub mod names {
    /// Count of HTTP requests.
    pub const HTTP_REQS: &str = "http_reqs";
    /// HTTP request latency trend (milliseconds).
    pub const HTTP_REQ_DURATION: &str = "http_req_duration";
    /// Rate of failed HTTP requests.
    pub const HTTP_REQ_FAILED: &str = "http_req_failed";
    /// Count of completed iterations.
    pub const ITERATIONS: &str = "iterations";
    /// Iteration latency trend (milliseconds).
    pub const ITERATION_DURATION: &str = "iteration_duration";
    /// Count of iterations that returned an error.
    pub const ITERATION_ERRORS: &str = "iteration_errors";
    /// Rate of passing checks.
    pub const CHECKS: &str = "checks";
}

#[derive(Debug, Default, Clone, Copy)]
struct RateCounts {
    hits: u64,
    total: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct CheckCounts {
    passes: u64,
    fails: u64,
}

/// Live metric storage.
#[derive(Debug, Default)]
pub struct Metrics {
    trends: DashMap<String, Vec<f64>>,
    rates: DashMap<String, RateCounts>,
    counters: DashMap<String, f64>,
    checks: DashMap<String, CheckCounts>,
}

impl Metrics {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sample to a trend.
    pub fn add_trend(&self, name: &str, value: f64) {
        self.trends.entry(name.to_string()).or_default().push(value);
    }

    /// Adds a sample to a rate; `hit` counts toward the rate's numerator.
    pub fn add_rate(&self, name: &str, hit: bool) {
        let mut counts = self.rates.entry(name.to_string()).or_default();
        counts.total += 1;
        if hit {
            counts.hits += 1;
        }
    }

    /// Adds to a counter.
    pub fn add_counter(&self, name: &str, delta: f64) {
        *self.counters.entry(name.to_string()).or_insert(0.0) += delta;
    }

    /// Records one named check outcome.
    pub fn record_check(&self, name: &str, passed: bool) {
        {
            let mut counts = self.checks.entry(name.to_string()).or_default();
            if passed {
                counts.passes += 1;
            } else {
                counts.fails += 1;
            }
        }
        self.add_rate(names::CHECKS, passed);
    }

    /// Records one HTTP request.
    pub fn record_request(&self, duration: Duration, failed: bool) {
        self.add_counter(names::HTTP_REQS, 1.0);
        self.add_trend(names::HTTP_REQ_DURATION, duration.as_secs_f64() * 1000.0);
        self.add_rate(names::HTTP_REQ_FAILED, failed);
    }

    /// Records one finished iteration.
    pub fn record_iteration(&self, duration: Duration, errored: bool) {
        self.add_counter(names::ITERATIONS, 1.0);
        self.add_trend(names::ITERATION_DURATION, duration.as_secs_f64() * 1000.0);
        if errored {
            self.add_counter(names::ITERATION_ERRORS, 1.0);
        }
    }

    /// Current value of a counter.
    #[must_use]
    pub fn counter(&self, name: &str) -> f64 {
        self.counters.get(name).map_or(0.0, |v| *v)
    }

    /// Aggregates everything recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut metrics = BTreeMap::new();

        for entry in &self.trends {
            metrics.insert(entry.key().clone(), MetricValue::Trend(TrendStats::from_samples(entry.value())));
        }
        for entry in &self.rates {
            let RateCounts { hits, total } = *entry.value();
            metrics.insert(entry.key().clone(), MetricValue::Rate(RateStats::new(hits, total)));
        }
        for entry in &self.counters {
            metrics.insert(entry.key().clone(), MetricValue::Counter(CounterStats { count: *entry.value() }));
        }

        let mut checks: Vec<CheckResult> = self
            .checks
            .iter()
            .map(|entry| CheckResult {
                name: entry.key().clone(),
                passes: entry.value().passes,
                fails: entry.value().fails,
            })
            .collect();
        checks.sort_by(|a, b| a.name.cmp(&b.name));

        MetricsSnapshot { metrics, checks }
    }
}

/// Statistics over trend samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStats {
    /// Sample count.
    pub count: usize,
    /// Mean.
    pub avg: f64,
    /// Minimum.
    pub min: f64,
    /// Median.
    pub med: f64,
    /// Maximum.
    pub max: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
    #[serde(skip)]
    sorted: Vec<f64>,
}

impl TrendStats {
    /// Computes statistics from raw samples.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_samples(samples: &[f64]) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let avg = if count == 0 {
            0.0
        } else {
            sorted.iter().sum::<f64>() / count as f64
        };

        Self {
            count,
            avg,
            min: sorted.first().copied().unwrap_or(0.0),
            med: percentile(&sorted, 50.0),
            max: sorted.last().copied().unwrap_or(0.0),
            p90: percentile(&sorted, 90.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
            sorted,
        }
    }

    /// Arbitrary percentile (0–100) with linear interpolation.
    ///
    /// Falls back to the named fields when samples were not retained
    /// (e.g. after deserializing a summary).
    #[must_use]
    pub fn percentile(&self, pct: f64) -> f64 {
        if self.sorted.is_empty() && self.count > 0 {
            return match pct {
                p if p >= 99.0 => self.p99,
                p if p >= 95.0 => self.p95,
                p if p >= 90.0 => self.p90,
                _ => self.med,
            };
        }
        percentile(&self.sorted, pct)
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (pct.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Statistics for a rate metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateStats {
    /// Samples counted toward the rate.
    pub hits: u64,
    /// All samples.
    pub total: u64,
    /// `hits / total` (0 when empty).
    pub rate: f64,
}

impl RateStats {
    #[allow(clippy::cast_precision_loss)]
    fn new(hits: u64, total: u64) -> Self {
        let rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        Self { hits, total, rate }
    }
}

/// Statistics for a counter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterStats {
    /// Accumulated total.
    pub count: f64,
}

/// A metric's aggregated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetricValue {
    /// Distribution of samples.
    Trend(TrendStats),
    /// Fraction of samples.
    Rate(RateStats),
    /// Running total.
    Counter(CounterStats),
}

impl MetricValue {
    /// Reads the statistic a threshold refers to, if this metric has it.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stat(&self, aggregate: Aggregate) -> Option<f64> {
        match (self, aggregate) {
            (Self::Trend(t), Aggregate::Avg) => Some(t.avg),
            (Self::Trend(t), Aggregate::Min) => Some(t.min),
            (Self::Trend(t), Aggregate::Max) => Some(t.max),
            (Self::Trend(t), Aggregate::Med) => Some(t.med),
            (Self::Trend(t), Aggregate::Percentile(p)) => Some(t.percentile(p)),
            (Self::Trend(t), Aggregate::Count) => Some(t.count as f64),
            (Self::Rate(r), Aggregate::Rate) => Some(r.rate),
            (Self::Rate(r), Aggregate::Count) => Some(r.hits as f64),
            (Self::Counter(c), Aggregate::Count) => Some(c.count),
            _ => None,
        }
    }
}

/// Outcome counts for one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check name.
    pub name: String,
    /// Times it passed.
    pub passes: u64,
    /// Times it failed.
    pub fails: u64,
}

impl CheckResult {
    /// True when the check never failed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.fails == 0
    }
}

/// Point-in-time aggregate of a [`Metrics`] registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Metrics by name.
    pub metrics: BTreeMap<String, MetricValue>,
    /// Checks, sorted by name.
    pub checks: Vec<CheckResult>,
}

impl MetricsSnapshot {
    /// Looks up one metric.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    /// Looks up one check.
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}
