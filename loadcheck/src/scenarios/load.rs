//! Mixed product and order workload ramping to 20 VUs.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::time::Duration;

use super::{id_of, pick, report_path, Scenario};
use crate::client::{NewOrder, NewProduct};
use crate::config::{LoadProfile, ScenarioOptions, StageTarget};
use crate::driver::{metric_names, IterationContext};
use crate::errors::LoadcheckError;

/// Counter incremented when an order is rejected for lack of stock.
pub const STOCK_OUT_COUNTER: &str = "stock_out_count";

/// Chance per iteration of also creating a product.
const CREATE_PRODUCT_PROBABILITY: f64 = 0.1;

/// Browses products, reserves stock, occasionally creates a product,
/// then places and reads back orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadScenario;

impl LoadScenario {
    async fn product_flow(ctx: &IterationContext) -> Result<(), LoadcheckError> {
        let products = ctx.client().product();

        let res = products.health().await?;
        ctx.check("product health status is 200", res.status == 200);

        let res = products.get_all().await?;
        ctx.check("get products status is 200", res.status == 200);

        if let Some(id) = pick(res.items()).and_then(id_of) {
            let single = products.get_one(id).await?;
            ctx.check("get single product status is 200", single.status == 200);

            let reserve = products.reserve(id, 1).await?;
            ctx.check(
                "reserve stock status is 200 or 422",
                matches!(reserve.status, 200 | 422),
            );
        }

        if let Some(product) = maybe_new_product() {
            let res = products.create(&product).await?;
            ctx.check("create product status is 201", res.status == 201);
        }
        Ok(())
    }

    async fn order_flow(ctx: &IterationContext) -> Result<(), LoadcheckError> {
        let orders = ctx.client().order();

        let res = orders.health().await?;
        ctx.check("order health status is 200", res.status == 200);

        let listed = ctx.client().product().get_all().await?;
        if let Some(product_id) = pick(listed.items()).and_then(id_of) {
            let order = NewOrder {
                user_id: rand::thread_rng().gen_range(1..=1000),
                product_id,
                quantity: 1,
            };
            let res = orders.create(&order).await?;
            if res.status == 422 {
                ctx.add_counter(STOCK_OUT_COUNTER, 1.0);
            }
            ctx.check(
                "order status is successful (20x or 422)",
                matches!(res.status, 201 | 422),
            );
            ctx.check("no server error", res.status < 500);
        }

        let res = orders.get_all().await?;
        ctx.check("get all orders status is 200", res.status == 200);

        if let Some(id) = pick(res.items()).and_then(id_of) {
            let single = orders.get_one(id).await?;
            ctx.check("get single order status is 200", single.status == 200);
        }
        Ok(())
    }
}

fn maybe_new_product() -> Option<NewProduct> {
    let mut rng = rand::thread_rng();
    if !rng.gen_bool(CREATE_PRODUCT_PROBABILITY) {
        return None;
    }
    Some(NewProduct {
        sku: format!("SKU-{}-{}", Utc::now().timestamp_millis(), rng.gen_range(0..1000)),
        name: "Load Test Product".to_string(),
        description: String::new(),
        price: 10.5,
        total_qty: 100,
    })
}

#[async_trait]
impl Scenario for LoadScenario {
    fn name(&self) -> &str {
        "load"
    }

    fn options(&self) -> ScenarioOptions {
        let mut options = ScenarioOptions::new(LoadProfile::ramping(vec![
            StageTarget::new(Duration::from_secs(30), 20),
            StageTarget::new(Duration::from_secs(60), 20),
            StageTarget::new(Duration::from_secs(20), 0),
        ]))
        .with_report_path(report_path("load"));

        for (metric, expression) in [
            (metric_names::HTTP_REQ_DURATION, "p(95)<500"),
            (metric_names::HTTP_REQ_FAILED, "rate<0.01"),
        ] {
            options = match options.clone().with_threshold(metric, expression) {
                Ok(updated) => updated,
                Err(err) => {
                    tracing::error!(metric, expression, error = %err, "Ignoring built-in threshold");
                    options
                }
            };
        }
        options
    }

    async fn iteration(&self, ctx: &IterationContext) -> Result<(), LoadcheckError> {
        Self::product_flow(ctx).await?;
        Self::order_flow(ctx).await?;
        ctx.sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiClient, ApiResponse, Method};
    use crate::config::ServiceEndpoints;
    use crate::driver::{MetricValue, WorkloadDriver};
    use crate::testing::{
        assert_check_passed, sample_order, sample_product, StubTransport,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn services(order_status: u16) -> StubTransport {
        StubTransport::new()
            .with_route(Method::Get, "/health", ApiResponse::new(200, None))
            .with_route(Method::Get, "/products", ApiResponse::new(200, Some(json!([sample_product(1)]))))
            .with_route(Method::Get, "/products/1", ApiResponse::new(200, Some(sample_product(1))))
            .with_route(Method::Post, "/products/reserve", ApiResponse::new(422, None))
            .with_route(Method::Post, "/products", ApiResponse::new(201, Some(sample_product(2))))
            .with_route(Method::Post, "/orders", ApiResponse::new(order_status, None))
            .with_route(Method::Get, "/orders", ApiResponse::new(200, Some(json!([sample_order(5, 1)]))))
            .with_route(Method::Get, "/orders/5", ApiResponse::new(200, Some(sample_order(5, 1))))
    }

    async fn run(stub: Arc<StubTransport>) -> crate::driver::Summary {
        let client = ApiClient::new(stub, ServiceEndpoints::default());
        let options = ScenarioOptions {
            profile: LoadProfile::iterations(1, 1),
            ..LoadScenario.options()
        };
        WorkloadDriver::new(client)
            .run(Arc::new(LoadScenario), &options)
            .await
            .unwrap()
    }

    #[test]
    fn test_options_match_profile() {
        let options = LoadScenario.options();
        assert_eq!(options.profile.max_vus(), 20);
        assert_eq!(options.profile.total_duration(), Some(Duration::from_secs(110)));
        assert_eq!(options.thresholds.len(), 2);
    }

    #[tokio::test]
    async fn test_full_flow_checks() {
        let stub = Arc::new(services(201));
        let summary = run(Arc::clone(&stub)).await;

        for check in [
            "product health status is 200",
            "get products status is 200",
            "get single product status is 200",
            "reserve stock status is 200 or 422",
            "order health status is 200",
            "order status is successful (20x or 422)",
            "no server error",
            "get all orders status is 200",
            "get single order status is 200",
        ] {
            assert_check_passed(&summary, check);
        }
        assert_eq!(stub.count(Method::Post, "/orders"), 1);
        assert!(summary.metrics.get(STOCK_OUT_COUNTER).is_none());
    }

    #[tokio::test]
    async fn test_stock_out_counted() {
        let summary = run(Arc::new(services(422))).await;

        match summary.metrics.get(STOCK_OUT_COUNTER) {
            Some(MetricValue::Counter(c)) => assert!((c.count - 1.0).abs() < f64::EPSILON),
            other => panic!("unexpected {other:?}"),
        }
        assert_check_passed(&summary, "order status is successful (20x or 422)");
    }

    #[test]
    fn test_new_product_shape() {
        let product = (0..1000).find_map(|_| maybe_new_product()).unwrap();
        assert!(product.sku.starts_with("SKU-"));
        assert_eq!(product.total_qty, 100);
    }
}
