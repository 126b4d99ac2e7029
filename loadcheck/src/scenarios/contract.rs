//! Contract scenario: live responses validated against the Swagger definitions.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{id_of, report_path, Scenario};
use crate::config::{LoadProfile, ScenarioOptions};
use crate::contracts::{ContractValidator, SchemaStore};
use crate::driver::IterationContext;
use crate::errors::LoadcheckError;

/// Definition name of a product.
pub const PRODUCT_DEFINITION: &str = "domain.Product";

/// Definition name of an order.
pub const ORDER_DEFINITION: &str = "domain.Order";

/// Validates the product and order listings, fetched concurrently, and one
/// product by id, recording each as a named check.
#[derive(Debug)]
pub struct ContractScenario {
    store: OnceCell<Arc<SchemaStore>>,
}

impl ContractScenario {
    /// Validates against an already loaded store.
    #[must_use]
    pub fn new(store: Arc<SchemaStore>) -> Self {
        Self {
            store: OnceCell::new_with(Some(store)),
        }
    }

    /// Downloads the Swagger document from the order service on first use.
    #[must_use]
    pub fn fetching() -> Self {
        Self {
            store: OnceCell::new(),
        }
    }

    async fn store(&self, ctx: &IterationContext) -> Result<&Arc<SchemaStore>, LoadcheckError> {
        self.store
            .get_or_try_init(|| async {
                let document = ctx.client().fetch_spec_document().await?;
                let store = SchemaStore::from_value(&document)?;
                tracing::info!(definitions = store.len(), "Loaded Swagger definitions from order service");
                Ok::<_, LoadcheckError>(Arc::new(store))
            })
            .await
    }
}

#[async_trait]
impl Scenario for ContractScenario {
    fn name(&self) -> &str {
        "contract"
    }

    fn options(&self) -> ScenarioOptions {
        ScenarioOptions::new(LoadProfile::iterations(1, 1)).with_report_path(report_path("contract"))
    }

    async fn iteration(&self, ctx: &IterationContext) -> Result<(), LoadcheckError> {
        let store = self.store(ctx).await?;
        let validator = ContractValidator::new(store);

        let (products, orders) = futures::future::try_join(
            ctx.client().product().get_all(),
            ctx.client().order().get_all(),
        )
        .await?;

        ctx.check_status(&products, "Products API", 200);
        let body = products.json().unwrap_or(&Value::Null);
        ctx.check_contract(
            "Products response matches domain.Product",
            &validator.validate_items(body, PRODUCT_DEFINITION),
        );

        if let Some(id) = products.items().first().and_then(id_of) {
            let single = ctx.client().product().get_one(id).await?;
            ctx.check_contract(
                "Product response matches domain.Product",
                &validator.validate(single.json().unwrap_or(&Value::Null), PRODUCT_DEFINITION),
            );
        }

        ctx.check_status(&orders, "Orders API", 200);
        ctx.check_contract(
            "Orders response matches domain.Order",
            &validator.validate_items(orders.json().unwrap_or(&Value::Null), ORDER_DEFINITION),
        );
        Ok(())
    }
}
