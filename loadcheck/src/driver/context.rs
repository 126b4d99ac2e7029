//! Per-VU iteration context handed to scenarios.

use std::sync::Arc;
use std::time::Duration;

use super::cancellation::CancellationToken;
use super::metrics::Metrics;
use crate::client::{ApiClient, ApiResponse};
use crate::contracts::ValidationResult;

/// What a scenario iteration can see and record.
#[derive(Debug, Clone)]
pub struct IterationContext {
    vu: u32,
    iteration: u64,
    client: Arc<ApiClient>,
    metrics: Arc<Metrics>,
    stop: Arc<CancellationToken>,
}

impl IterationContext {
    /// Creates a context for virtual user `vu` (1-based).
    #[must_use]
    pub fn new(
        vu: u32,
        client: Arc<ApiClient>,
        metrics: Arc<Metrics>,
        stop: Arc<CancellationToken>,
    ) -> Self {
        Self {
            vu,
            iteration: 0,
            client,
            metrics,
            stop,
        }
    }

    /// Virtual user number, starting at 1.
    #[must_use]
    pub const fn vu(&self) -> u32 {
        self.vu
    }

    /// Iteration number of this VU, starting at 0.
    #[must_use]
    pub const fn iteration(&self) -> u64 {
        self.iteration
    }

    pub(crate) fn advance(&mut self) {
        self.iteration += 1;
    }

    /// Service client; requests are recorded into the run's metrics.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The run's metric registry.
    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Records a named check and returns its outcome.
    pub fn check(&self, name: &str, passed: bool) -> bool {
        self.metrics.record_check(name, passed);
        if !passed {
            tracing::debug!(vu = self.vu, iteration = self.iteration, check = name, "Check failed");
        }
        passed
    }

    /// Records `"<name> is <expected>"` against a response status.
    pub fn check_status(&self, response: &ApiResponse, name: &str, expected: u16) -> bool {
        self.check(&format!("{name} is {expected}"), response.status == expected)
    }

    /// Records a contract check from a validation result.
    pub fn check_contract(&self, name: &str, result: &ValidationResult) -> bool {
        if !result.is_valid() {
            tracing::warn!(
                vu = self.vu,
                check = name,
                violations = result.violations.len(),
                "Contract violation"
            );
        }
        self.check(name, result.is_valid())
    }

    /// Adds to a custom counter.
    pub fn add_counter(&self, name: &str, delta: f64) {
        self.metrics.add_counter(name, delta);
    }

    /// Whether the run is stopping.
    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Think time between requests; returns early when the run stops.
    pub async fn sleep(&self, duration: Duration) {
        tokio::select! {
            () = tokio::time::sleep(duration) => {}
            () = self.stop.cancelled() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceEndpoints;
    use crate::contracts::{validate, SchemaStore};
    use crate::testing::StubTransport;
    use serde_json::json;
    use std::time::Instant;

    fn context() -> IterationContext {
        let client = ApiClient::new(Arc::new(StubTransport::new()), ServiceEndpoints::default());
        IterationContext::new(
            3,
            Arc::new(client),
            Arc::new(Metrics::new()),
            Arc::new(CancellationToken::new()),
        )
    }

    #[test]
    fn test_check_status_names() {
        let ctx = context();
        assert!(ctx.check_status(&ApiResponse::new(200, None), "Products API", 200));
        assert!(!ctx.check_status(&ApiResponse::new(500, None), "Products API", 200));

        let snap = ctx.metrics().snapshot();
        let check = snap.check("Products API is 200").unwrap();
        assert_eq!((check.passes, check.fails), (1, 1));
    }

    #[test]
    fn test_check_contract() {
        let ctx = context();
        let store = SchemaStore::from_value(&json!({"definitions": {"P": {"required": ["id"]}}})).unwrap();
        assert!(!ctx.check_contract("P contract", &validate(&json!({}), "P", &store)));
        assert_eq!(ctx.metrics().snapshot().check("P contract").unwrap().fails, 1);
    }

    #[test]
    fn test_advance() {
        let mut ctx = context();
        assert_eq!((ctx.vu(), ctx.iteration()), (3, 0));
        ctx.advance();
        assert_eq!(ctx.iteration(), 1);
    }

    #[tokio::test]
    async fn test_sleep_cut_short_by_stop() {
        let ctx = context();
        ctx.stop.cancel("done");
        let started = Instant::now();
        ctx.sleep(Duration::from_secs(10)).await;
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(ctx.is_stopping());
    }
}
