//! Fixed-shape traffic scenarios: smoke, stress, spike, soak, benchmark, fault injection.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use super::{id_of, pick, report_path, Scenario};
use crate::client::NewOrder;
use crate::config::{LoadProfile, ScenarioOptions, StageTarget};
use crate::driver::{metric_names, IterationContext};
use crate::errors::LoadcheckError;

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

fn options(profile: LoadProfile, thresholds: &[(&str, &str)], report: &str) -> ScenarioOptions {
    let mut options = ScenarioOptions::new(profile).with_report_path(report_path(report));
    for (metric, expression) in thresholds {
        match expression.parse() {
            Ok(threshold) => options
                .thresholds
                .entry((*metric).to_string())
                .or_default()
                .push(threshold),
            Err(err) => tracing::error!(metric, expression, error = %err, "Ignoring built-in threshold"),
        }
    }
    options
}

/// Both health endpoints, one VU, ten seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmokeScenario;

#[async_trait]
impl Scenario for SmokeScenario {
    fn name(&self) -> &str {
        "smoke"
    }

    fn options(&self) -> ScenarioOptions {
        options(
            LoadProfile::fixed(1, Duration::from_secs(10)),
            &[(metric_names::HTTP_REQ_FAILED, "rate<0.01")],
            "smoke",
        )
    }

    async fn iteration(&self, ctx: &IterationContext) -> Result<(), LoadcheckError> {
        let res = ctx.client().product().health().await?;
        ctx.check_status(&res, "Product Health", 200);
        let res = ctx.client().order().health().await?;
        ctx.check_status(&res, "Order Health", 200);
        ctx.sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

/// Browse a product and order it, ramping to 200 VUs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StressScenario;

#[async_trait]
impl Scenario for StressScenario {
    fn name(&self) -> &str {
        "stress"
    }

    fn options(&self) -> ScenarioOptions {
        options(
            LoadProfile::ramping(vec![
                StageTarget::new(minutes(2), 50),
                StageTarget::new(minutes(3), 100),
                StageTarget::new(minutes(2), 200),
                StageTarget::new(minutes(2), 0),
            ]),
            &[
                (metric_names::HTTP_REQ_DURATION, "p(95)<1000"),
                (metric_names::HTTP_REQ_FAILED, "rate<0.05"),
            ],
            "stress",
        )
    }

    async fn iteration(&self, ctx: &IterationContext) -> Result<(), LoadcheckError> {
        let products = ctx.client().product().get_all().await?;
        if let Some(product_id) = pick(products.items()).and_then(id_of) {
            ctx.client().product().get_one(product_id).await?;
            let order = NewOrder {
                user_id: rand::thread_rng().gen_range(0..1000),
                product_id,
                quantity: 1,
            };
            ctx.client().order().create(&order).await?;
        }
        ctx.sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

/// Sudden jump from 20 to 500 VUs on the product health endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpikeScenario;

#[async_trait]
impl Scenario for SpikeScenario {
    fn name(&self) -> &str {
        "spike"
    }

    fn options(&self) -> ScenarioOptions {
        options(
            LoadProfile::ramping(vec![
                StageTarget::new(Duration::from_secs(10), 20),
                StageTarget::new(Duration::from_secs(20), 500),
                StageTarget::new(minutes(1), 500),
                StageTarget::new(Duration::from_secs(20), 20),
                StageTarget::new(Duration::from_secs(10), 0),
            ]),
            &[(metric_names::HTTP_REQ_FAILED, "rate<0.1")],
            "spike",
        )
    }

    async fn iteration(&self, ctx: &IterationContext) -> Result<(), LoadcheckError> {
        ctx.client().product().health().await?;
        ctx.sleep(Duration::from_millis(500)).await;
        Ok(())
    }
}

/// Sustained listing of products and orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoakScenario;

#[async_trait]
impl Scenario for SoakScenario {
    fn name(&self) -> &str {
        "soak"
    }

    fn options(&self) -> ScenarioOptions {
        options(
            LoadProfile::ramping(vec![
                StageTarget::new(minutes(1), 30),
                StageTarget::new(minutes(2), 30),
                StageTarget::new(minutes(1), 0),
            ]),
            &[
                (metric_names::HTTP_REQ_DURATION, "p(95)<500"),
                (metric_names::HTTP_REQ_FAILED, "rate<0.01"),
            ],
            "soak",
        )
    }

    async fn iteration(&self, ctx: &IterationContext) -> Result<(), LoadcheckError> {
        ctx.client().product().get_all().await?;
        ctx.client().order().get_all().await?;
        ctx.sleep(Duration::from_secs(2)).await;
        Ok(())
    }
}

/// Latency baseline of the product health endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkScenario;

#[async_trait]
impl Scenario for BenchmarkScenario {
    fn name(&self) -> &str {
        "benchmark"
    }

    fn options(&self) -> ScenarioOptions {
        options(
            LoadProfile::fixed(10, Duration::from_secs(30)),
            &[(metric_names::HTTP_REQ_DURATION, "p(95)<200")],
            "benchmark",
        )
    }

    async fn iteration(&self, ctx: &IterationContext) -> Result<(), LoadcheckError> {
        ctx.client().product().health().await?;
        ctx.sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

/// Product listing with no thresholds, for observing behavior under injected faults.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultInjectionScenario;

#[async_trait]
impl Scenario for FaultInjectionScenario {
    fn name(&self) -> &str {
        "fault_injection"
    }

    fn options(&self) -> ScenarioOptions {
        options(LoadProfile::fixed(10, Duration::from_secs(30)), &[], "fault")
    }

    async fn iteration(&self, ctx: &IterationContext) -> Result<(), LoadcheckError> {
        ctx.client().product().get_all().await?;
        ctx.sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiClient, ApiResponse, Method};
    use crate::config::ServiceEndpoints;
    use crate::driver::WorkloadDriver;
    use crate::testing::{assert_check_failed, assert_check_passed, sample_product, StubTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    async fn run_once(scenario: Arc<dyn Scenario>, stub: &Arc<StubTransport>) -> crate::driver::Summary {
        let client = ApiClient::new(Arc::clone(stub) as _, ServiceEndpoints::default());
        let options = ScenarioOptions {
            profile: LoadProfile::iterations(1, 1),
            ..scenario.options()
        };
        let driver = WorkloadDriver::new(client).with_tick(Duration::from_millis(5));
        driver.run(scenario, &options).await.unwrap()
    }

    #[test]
    fn test_builtin_options() {
        let stress = StressScenario.options();
        assert_eq!(stress.profile.max_vus(), 200);
        assert_eq!(stress.profile.total_duration(), Some(minutes(9)));
        assert_eq!(stress.thresholds[metric_names::HTTP_REQ_DURATION][0].expression(), "p(95)<1000");

        let spike = SpikeScenario.options();
        assert_eq!(spike.profile.max_vus(), 500);
        assert_eq!(spike.profile.total_duration(), Some(Duration::from_secs(120)));

        assert_eq!(SmokeScenario.options().profile, LoadProfile::fixed(1, Duration::from_secs(10)));
        assert!(FaultInjectionScenario.options().thresholds.is_empty());
        assert_eq!(
            FaultInjectionScenario.options().report_path,
            Some(report_path("fault"))
        );
    }

    #[tokio::test]
    async fn test_smoke_checks_both_services() {
        let stub = Arc::new(
            StubTransport::new()
                .with_route(Method::Get, ":8081/health", ApiResponse::new(200, None))
                .with_route(Method::Get, ":8082/health", ApiResponse::new(503, None)),
        );
        let summary = run_once(Arc::new(SmokeScenario), &stub).await;

        assert_check_passed(&summary, "Product Health is 200");
        assert_check_failed(&summary, "Order Health is 200");
        assert!(!summary.thresholds_passed());
    }

    #[tokio::test]
    async fn test_stress_orders_listed_product() {
        let stub = Arc::new(
            StubTransport::new()
                .with_route(Method::Get, "/products", ApiResponse::new(200, Some(json!([sample_product(9)]))))
                .with_route(Method::Get, "/products/9", ApiResponse::new(200, Some(sample_product(9))))
                .with_route(Method::Post, "/orders", ApiResponse::new(201, None)),
        );
        let summary = run_once(Arc::new(StressScenario), &stub).await;

        let orders: Vec<_> = stub
            .requests()
            .into_iter()
            .filter(|r| r.method == Method::Post)
            .collect();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].body.as_ref().unwrap()["product_id"], json!(9));
        assert!(summary.thresholds_passed());
    }

    #[tokio::test]
    async fn test_stress_skips_order_without_products() {
        let stub = Arc::new(
            StubTransport::new().with_route(Method::Get, "/products", ApiResponse::new(200, Some(json!([])))),
        );
        run_once(Arc::new(StressScenario), &stub).await;
        assert_eq!(stub.count(Method::Post, "/orders"), 0);
    }

    #[tokio::test]
    async fn test_soak_lists_both() {
        let stub = Arc::new(StubTransport::new().with_default(ApiResponse::new(200, Some(json!([])))));
        run_once(Arc::new(SoakScenario), &stub).await;
        assert_eq!(stub.count(Method::Get, "/products"), 1);
        assert_eq!(stub.count(Method::Get, "/orders"), 1);
    }
}
