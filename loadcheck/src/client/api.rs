//! Thin wrappers over the product and order service endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use super::transport::{ApiResponse, HttpRequest, HttpTransport};
use crate::config::ServiceEndpoints;
use crate::driver::Metrics;
use crate::errors::LoadcheckError;

/// Path of the generated Swagger document on the order service.
pub const SPEC_DOCUMENT_PATH: &str = "/swagger/doc.json";

/// Payload for `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Stock keeping unit; must be unique.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Initial stock.
    pub total_qty: i64,
}

/// Payload for the stock endpoints (`reserve`, `release`, `confirm`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRequest {
    /// Product to adjust.
    pub product_id: i64,
    /// Units.
    pub quantity: i64,
}

/// Payload for `POST /orders`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Ordering user.
    pub user_id: i64,
    /// Ordered product.
    pub product_id: i64,
    /// Units.
    pub quantity: i64,
}

/// Client for both services, recording request metrics when attached to a run.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    endpoints: ServiceEndpoints,
    metrics: Option<Arc<Metrics>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoints", &self.endpoints)
            .field("records_metrics", &self.metrics.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Creates a client.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: ServiceEndpoints) -> Self {
        Self {
            transport,
            endpoints,
            metrics: None,
        }
    }

    /// Records every request into `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Configured endpoints.
    #[must_use]
    pub const fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// Product catalog endpoints.
    #[must_use]
    pub const fn product(&self) -> ProductApi<'_> {
        ProductApi { client: self }
    }

    /// Order service endpoints.
    #[must_use]
    pub const fn order(&self) -> OrderApi<'_> {
        OrderApi { client: self }
    }

    /// Downloads the Swagger document served by the order service.
    pub async fn fetch_spec_document(&self) -> Result<Value, LoadcheckError> {
        let url = format!("{}{SPEC_DOCUMENT_PATH}", self.endpoints.order);
        let response = self.execute(HttpRequest::get(url.clone())).await?;
        if !response.is_success() {
            return Err(LoadcheckError::Http(format!(
                "GET {url} returned status {}",
                response.status
            )));
        }
        response
            .body
            .ok_or_else(|| LoadcheckError::Http(format!("GET {url} returned no JSON body")))
    }

    /// Sends a request through the transport, recording metrics.
    pub async fn execute(&self, request: HttpRequest) -> Result<ApiResponse, LoadcheckError> {
        let started = Instant::now();
        let method = request.method;
        let url = request.url.clone();

        match self.transport.send(request).await {
            Ok(response) => {
                if let Some(metrics) = &self.metrics {
                    let duration = if response.duration.is_zero() {
                        started.elapsed()
                    } else {
                        response.duration
                    };
                    metrics.record_request(duration, response.is_failure());
                }
                tracing::trace!(%method, %url, status = response.status, "HTTP request completed");
                Ok(response)
            }
            Err(err) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_request(started.elapsed(), true);
                }
                tracing::debug!(%method, %url, error = %err, "HTTP request failed");
                Err(err)
            }
        }
    }

    async fn get(&self, base: &str, path: &str) -> Result<ApiResponse, LoadcheckError> {
        self.execute(HttpRequest::get(format!("{base}{path}"))).await
    }

    async fn post<T: Serialize + Sync>(
        &self,
        base: &str,
        path: &str,
        payload: &T,
    ) -> Result<ApiResponse, LoadcheckError> {
        let body = serde_json::to_value(payload)?;
        self.execute(HttpRequest::post(format!("{base}{path}"), body))
            .await
    }
}

/// Product catalog endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ProductApi<'a> {
    client: &'a ApiClient,
}

impl ProductApi<'_> {
    fn base(&self) -> &str {
        &self.client.endpoints.product
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<ApiResponse, LoadcheckError> {
        self.client.get(self.base(), "/health").await
    }

    /// `GET /products`
    pub async fn get_all(&self) -> Result<ApiResponse, LoadcheckError> {
        self.client.get(self.base(), "/products").await
    }

    /// `GET /products/{id}`
    pub async fn get_one(&self, id: i64) -> Result<ApiResponse, LoadcheckError> {
        self.client.get(self.base(), &format!("/products/{id}")).await
    }

    /// `POST /products`
    pub async fn create(&self, product: &NewProduct) -> Result<ApiResponse, LoadcheckError> {
        self.client.post(self.base(), "/products", product).await
    }

    /// `POST /products/reserve`
    pub async fn reserve(&self, product_id: i64, quantity: i64) -> Result<ApiResponse, LoadcheckError> {
        self.stock("/products/reserve", product_id, quantity).await
    }

    /// `POST /products/release`
    pub async fn release(&self, product_id: i64, quantity: i64) -> Result<ApiResponse, LoadcheckError> {
        self.stock("/products/release", product_id, quantity).await
    }

    /// `POST /products/confirm`
    pub async fn confirm(&self, product_id: i64, quantity: i64) -> Result<ApiResponse, LoadcheckError> {
        self.stock("/products/confirm", product_id, quantity).await
    }

    async fn stock(&self, path: &str, product_id: i64, quantity: i64) -> Result<ApiResponse, LoadcheckError> {
        let request = StockRequest { product_id, quantity };
        self.client.post(self.base(), path, &request).await
    }
}

/// Order service endpoints.
#[derive(Debug, Clone, Copy)]
pub struct OrderApi<'a> {
    client: &'a ApiClient,
}

impl OrderApi<'_> {
    fn base(&self) -> &str {
        &self.client.endpoints.order
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<ApiResponse, LoadcheckError> {
        self.client.get(self.base(), "/health").await
    }

    /// `GET /orders`
    pub async fn get_all(&self) -> Result<ApiResponse, LoadcheckError> {
        self.client.get(self.base(), "/orders").await
    }

    /// `GET /orders/{id}`
    pub async fn get_one(&self, id: i64) -> Result<ApiResponse, LoadcheckError> {
        self.client.get(self.base(), &format!("/orders/{id}")).await
    }

    /// `POST /orders`
    pub async fn create(&self, order: &NewOrder) -> Result<ApiResponse, LoadcheckError> {
        self.client.post(self.base(), "/orders", order).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::{Method, MockHttpTransport};
    use crate::driver::metric_names;
    use mockall::predicate::eq;
    use serde_json::json;
    use std::time::Duration;

    fn endpoints() -> ServiceEndpoints {
        ServiceEndpoints {
            product: "http://products".to_string(),
            order: "http://orders".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_one_builds_url() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .with(eq(HttpRequest::get("http://products/products/7")))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, Some(json!({"id": 7})))));

        let client = ApiClient::new(Arc::new(transport), endpoints());
        let response = client.product().get_one(7).await.unwrap();
        assert_eq!(response.json(), Some(&json!({"id": 7})));
    }

    #[tokio::test]
    async fn test_create_order_posts_json() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.url == "http://orders/orders"
                    && req.body == Some(json!({"user_id": 1, "product_id": 2, "quantity": 3}))
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::new(201, None)));

        let client = ApiClient::new(Arc::new(transport), endpoints());
        let order = NewOrder { user_id: 1, product_id: 2, quantity: 3 };
        assert_eq!(client.order().create(&order).await.unwrap().status, 201);
    }

    #[tokio::test]
    async fn test_reserve_payload() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url == "http://products/products/reserve"
                    && req.body == Some(json!({"product_id": 5, "quantity": 1}))
            })
            .returning(|_| Ok(ApiResponse::new(422, None)));

        let client = ApiClient::new(Arc::new(transport), endpoints());
        assert_eq!(client.product().reserve(5, 1).await.unwrap().status, 422);
    }

    #[tokio::test]
    async fn test_metrics_recorded_for_failures_and_errors() {
        let mut transport = MockHttpTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(ApiResponse {
                    status: 500,
                    body: None,
                    duration: Duration::from_millis(20),
                })
            });
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(LoadcheckError::Http("connection refused".to_string())));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::new(200, None)));

        let metrics = Arc::new(Metrics::new());
        let client = ApiClient::new(Arc::new(transport), endpoints()).with_metrics(Arc::clone(&metrics));

        assert_eq!(client.product().health().await.unwrap().status, 500);
        assert!(client.order().health().await.is_err());
        assert!(client.order().get_all().await.is_ok());

        let snap = metrics.snapshot();
        assert_eq!(metrics.counter(metric_names::HTTP_REQS), 3.0);
        match snap.get(metric_names::HTTP_REQ_FAILED) {
            Some(crate::driver::MetricValue::Rate(r)) => assert_eq!((r.hits, r.total), (2, 3)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_spec_document() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .with(eq(HttpRequest::get("http://orders/swagger/doc.json")))
            .returning(|_| Ok(ApiResponse::new(200, Some(json!({"definitions": {}})))));

        let client = ApiClient::new(Arc::new(transport), endpoints());
        let doc = client.fetch_spec_document().await.unwrap();
        assert!(doc.get("definitions").is_some());
    }

    #[tokio::test]
    async fn test_fetch_spec_document_not_found() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(ApiResponse::new(404, None)));

        let client = ApiClient::new(Arc::new(transport), endpoints());
        let err = client.fetch_spec_document().await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
