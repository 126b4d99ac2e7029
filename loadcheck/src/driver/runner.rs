//! Workload driver: runs a scenario's iteration across virtual users.

use chrono::Utc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use super::cancellation::CancellationToken;
use super::context::IterationContext;
use super::metrics::Metrics;
use super::summary::Summary;
use crate::client::ApiClient;
use crate::config::{LoadProfile, ScenarioOptions};
use crate::errors::LoadcheckError;
use crate::scenarios::Scenario;

/// Default scheduler tick.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Default time in-flight iterations get to finish once a run stops.
pub const DEFAULT_GRACEFUL_STOP: Duration = Duration::from_secs(30);

/// Runs scenarios against the services.
#[derive(Debug)]
pub struct WorkloadDriver {
    client: ApiClient,
    tick: Duration,
    graceful_stop: Duration,
    cancel: Arc<CancellationToken>,
}

impl WorkloadDriver {
    /// Creates a driver around a client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            tick: DEFAULT_TICK,
            graceful_stop: DEFAULT_GRACEFUL_STOP,
            cancel: Arc::new(CancellationToken::new()),
        }
    }

    /// Sets how often the VU target is re-evaluated.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    /// Sets how long in-flight iterations may run after the run stops.
    #[must_use]
    pub const fn with_graceful_stop(mut self, graceful_stop: Duration) -> Self {
        self.graceful_stop = graceful_stop;
        self
    }

    /// Token that interrupts a running scenario when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> Arc<CancellationToken> {
        Arc::clone(&self.cancel)
    }

    /// Runs a scenario with its own options.
    pub async fn run_scenario(&self, scenario: Arc<dyn Scenario>) -> Result<Summary, LoadcheckError> {
        let options = scenario.options();
        self.run(scenario, &options).await
    }

    /// Runs a scenario with the given options and returns the evaluated summary.
    pub async fn run(
        &self,
        scenario: Arc<dyn Scenario>,
        options: &ScenarioOptions,
    ) -> Result<Summary, LoadcheckError> {
        options.validate()?;
        if self.cancel.is_cancelled() {
            return Err(LoadcheckError::Cancelled(
                self.cancel.reason().unwrap_or_else(|| "cancelled before start".to_string()),
            ));
        }

        let profile = &options.profile;
        let metrics = Arc::new(Metrics::new());
        let client = Arc::new(self.client.clone().with_metrics(Arc::clone(&metrics)));
        let stop = Arc::new(CancellationToken::new());
        let active = Arc::new(AtomicU32::new(profile.target_at(Duration::ZERO)));
        let budget = match profile {
            LoadProfile::Iterations { iterations, .. } => Some(Arc::new(AtomicU64::new(*iterations))),
            _ => None,
        };

        let max_vus = profile.max_vus();
        tracing::info!(
            scenario = scenario.name(),
            max_vus,
            duration = ?profile.total_duration(),
            "Starting scenario"
        );

        let started_at = Utc::now();
        let started = Instant::now();

        let mut tasks = JoinSet::new();
        for vu in 1..=max_vus {
            let ctx = IterationContext::new(vu, Arc::clone(&client), Arc::clone(&metrics), Arc::clone(&stop));
            tasks.spawn(run_vu(
                ctx,
                Arc::clone(&scenario),
                Arc::clone(&active),
                budget.clone(),
                Arc::clone(&stop),
                self.tick,
            ));
        }

        let total = profile.total_duration();
        loop {
            let elapsed = started.elapsed();
            if self.cancel.is_cancelled() {
                stop.cancel(self.cancel.reason().unwrap_or_else(|| "cancelled".to_string()));
            } else if total.is_some_and(|t| elapsed >= t) {
                stop.cancel("duration elapsed");
            }
            if stop.is_cancelled() {
                break;
            }

            active.store(profile.target_at(elapsed), Ordering::SeqCst);

            tokio::select! {
                () = tokio::time::sleep(self.tick) => {}
                () = self.cancel.cancelled() => {}
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Err(err)) => tracing::error!(error = %err, "Virtual user task failed"),
                    Some(Ok(())) => {}
                },
            }
        }

        stop.cancel("run complete");
        let drained = tokio::time::timeout(self.graceful_stop, async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(err) = joined {
                    tracing::error!(error = %err, "Virtual user task failed");
                }
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!(
                graceful_stop = ?self.graceful_stop,
                "Aborting iterations still running after graceful stop"
            );
            tasks.abort_all();
        }

        let mut summary = Summary::new(
            scenario.name(),
            started_at,
            Utc::now(),
            metrics.snapshot(),
            &options.thresholds,
        );
        if self.cancel.is_cancelled() {
            summary = summary.with_interrupted(self.cancel.reason().unwrap_or_default());
        }

        tracing::info!(
            scenario = scenario.name(),
            run_id = %summary.run_id,
            passed = summary.passed(),
            elapsed = ?started.elapsed(),
            "Scenario finished"
        );
        Ok(summary)
    }
}

async fn run_vu(
    mut ctx: IterationContext,
    scenario: Arc<dyn Scenario>,
    active: Arc<AtomicU32>,
    budget: Option<Arc<AtomicU64>>,
    stop: Arc<CancellationToken>,
    tick: Duration,
) {
    while !stop.is_cancelled() {
        if ctx.vu() > active.load(Ordering::SeqCst) {
            tokio::select! {
                () = tokio::time::sleep(tick) => {}
                () = stop.cancelled() => {}
            }
            continue;
        }

        if let Some(budget) = &budget {
            let claimed = budget
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
            if !claimed {
                break;
            }
        }

        let started = Instant::now();
        let outcome = scenario.iteration(&ctx).await;
        ctx.metrics().record_iteration(started.elapsed(), outcome.is_err());
        if let Err(err) = outcome {
            tracing::warn!(
                scenario = scenario.name(),
                vu = ctx.vu(),
                iteration = ctx.iteration(),
                error = %err,
                "Iteration failed"
            );
        }
        ctx.advance();
    }
}
