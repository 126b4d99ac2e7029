//! Virtual-user load profiles.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::duration::serde_duration;
use crate::errors::ConfigError;

/// One ramp stage: move linearly to `target` VUs over `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTarget {
    /// Stage length.
    #[serde(with = "serde_duration")]
    pub duration: Duration,
    /// VU count reached at the end of the stage.
    pub target: u32,
}

impl StageTarget {
    /// Creates a stage.
    #[must_use]
    pub const fn new(duration: Duration, target: u32) -> Self {
        Self { duration, target }
    }
}

/// How many virtual users run, and for how long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoadProfile {
    /// Ramp through stages, starting from zero VUs.
    Ramping {
        /// Stages in order.
        stages: Vec<StageTarget>,
    },
    /// A fixed number of VUs sharing an iteration budget.
    Iterations {
        /// Concurrent VUs.
        vus: u32,
        /// Total iterations across all VUs.
        iterations: u64,
    },
    /// A fixed number of VUs looping for a duration.
    Fixed {
        /// Concurrent VUs.
        vus: u32,
        /// Run length.
        #[serde(with = "serde_duration")]
        duration: Duration,
    },
}

impl LoadProfile {
    /// Constant VUs for a duration.
    #[must_use]
    pub const fn fixed(vus: u32, duration: Duration) -> Self {
        Self::Fixed { vus, duration }
    }

    /// Constant VUs for a total number of iterations.
    #[must_use]
    pub const fn iterations(vus: u32, iterations: u64) -> Self {
        Self::Iterations { vus, iterations }
    }

    /// Ramping stages.
    #[must_use]
    pub fn ramping(stages: impl Into<Vec<StageTarget>>) -> Self {
        Self::Ramping {
            stages: stages.into(),
        }
    }

    /// Rejects profiles that could never run an iteration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Fixed { vus: 0, .. } | Self::Iterations { vus: 0, .. } => Err(
                ConfigError::InvalidProfile("vus must be greater than zero".to_string()),
            ),
            Self::Iterations { iterations: 0, .. } => Err(ConfigError::InvalidProfile(
                "iterations must be greater than zero".to_string(),
            )),
            Self::Ramping { stages } if stages.is_empty() => Err(ConfigError::InvalidProfile(
                "ramping profile needs at least one stage".to_string(),
            )),
            Self::Ramping { stages } if stages.iter().all(|s| s.target == 0) => Err(
                ConfigError::InvalidProfile("every stage targets zero VUs".to_string()),
            ),
            Self::Ramping { stages } if stages_total(stages).is_none() => Err(
                ConfigError::InvalidProfile("stage durations overflow".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Largest number of VUs that can be active at once.
    #[must_use]
    pub fn max_vus(&self) -> u32 {
        match self {
            Self::Fixed { vus, .. } | Self::Iterations { vus, .. } => *vus,
            Self::Ramping { stages } => stages.iter().map(|s| s.target).max().unwrap_or(0),
        }
    }

    /// Planned run length; `None` when bounded by iterations instead, or
    /// when the stage durations overflow (rejected by [`validate`](Self::validate)).
    #[must_use]
    pub fn total_duration(&self) -> Option<Duration> {
        match self {
            Self::Fixed { duration, .. } => Some(*duration),
            Self::Iterations { .. } => None,
            Self::Ramping { stages } => stages_total(stages),
        }
    }

    /// Number of VUs that should be active `elapsed` into the run.
    #[must_use]
    pub fn target_at(&self, elapsed: Duration) -> u32 {
        match self {
            Self::Fixed { vus, duration } => {
                if elapsed < *duration {
                    *vus
                } else {
                    0
                }
            }
            Self::Iterations { vus, .. } => *vus,
            Self::Ramping { stages } => ramp_target(stages, elapsed),
        }
    }
}

fn stages_total(stages: &[StageTarget]) -> Option<Duration> {
    stages
        .iter()
        .try_fold(Duration::ZERO, |total, stage| total.checked_add(stage.duration))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ramp_target(stages: &[StageTarget], elapsed: Duration) -> u32 {
    let mut from = 0_u32;
    let mut stage_start = Duration::ZERO;

    for stage in stages {
        let stage_end = stage_start.saturating_add(stage.duration);
        if elapsed < stage_end {
            let progress = if stage.duration.is_zero() {
                1.0
            } else {
                (elapsed - stage_start).as_secs_f64() / stage.duration.as_secs_f64()
            };
            let delta = f64::from(stage.target) - f64::from(from);
            let value = f64::from(from) + delta * progress;
            return value.round().max(0.0) as u32;
        }
        from = stage.target;
        stage_start = stage_end;
    }

    0
}
