//! Pass/fail threshold expressions such as `"p(95)<500"` or `"rate<0.01"`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::ConfigError;

fn threshold_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(avg|min|max|med|rate|count|p\((\d+(?:\.\d+)?)\))\s*(<=|>=|==|<|>)\s*(-?\d+(?:\.\d+)?)\s*$",
        )
        .expect("threshold pattern is valid")
    })
}

/// The statistic a threshold is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregate {
    /// Mean of a trend.
    Avg,
    /// Minimum of a trend.
    Min,
    /// Maximum of a trend.
    Max,
    /// Median of a trend.
    Med,
    /// Percentile of a trend, e.g. `p(95)`.
    Percentile(f64),
    /// Fraction of non-zero samples of a rate.
    Rate,
    /// Total of a counter.
    Count,
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
}

impl Comparison {
    fn holds(self, observed: f64, limit: f64) -> bool {
        match self {
            Self::Lt => observed < limit,
            Self::Le => observed <= limit,
            Self::Gt => observed > limit,
            Self::Ge => observed >= limit,
            Self::Eq => (observed - limit).abs() < f64::EPSILON,
        }
    }
}

/// A parsed threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Threshold {
    /// Statistic to read from the metric.
    pub aggregate: Aggregate,
    /// Operator.
    pub comparison: Comparison,
    /// Right-hand side.
    pub limit: f64,
    source: String,
}

impl Threshold {
    /// Whether the observed statistic satisfies this threshold.
    #[must_use]
    pub fn is_satisfied_by(&self, observed: f64) -> bool {
        self.comparison.holds(observed, self.limit)
    }

    /// The expression as originally written.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.source
    }
}

impl FromStr for Threshold {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidThreshold(text.to_string());
        let caps = threshold_pattern().captures(text).ok_or_else(invalid)?;

        let aggregate = match &caps[1] {
            "avg" => Aggregate::Avg,
            "min" => Aggregate::Min,
            "max" => Aggregate::Max,
            "med" => Aggregate::Med,
            "rate" => Aggregate::Rate,
            "count" => Aggregate::Count,
            _ => {
                let pct: f64 = caps
                    .get(2)
                    .ok_or_else(invalid)?
                    .as_str()
                    .parse()
                    .map_err(|_| invalid())?;
                if !(0.0..=100.0).contains(&pct) {
                    return Err(invalid());
                }
                Aggregate::Percentile(pct)
            }
        };

        let comparison = match &caps[3] {
            "<" => Comparison::Lt,
            "<=" => Comparison::Le,
            ">" => Comparison::Gt,
            ">=" => Comparison::Ge,
            _ => Comparison::Eq,
        };

        let limit: f64 = caps[4].parse().map_err(|_| invalid())?;

        Ok(Self {
            aggregate,
            comparison,
            limit,
            source: text.trim().to_string(),
        })
    }
}

impl TryFrom<String> for Threshold {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Threshold> for String {
    fn from(threshold: Threshold) -> Self {
        threshold.source
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
