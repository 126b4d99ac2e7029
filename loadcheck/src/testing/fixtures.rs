//! Sample Swagger document and response bodies for the product and order services.

use serde_json::{json, Value};

use crate::contracts::SchemaStore;

/// Schema name of a product in the generated Swagger document.
pub const PRODUCT_SCHEMA: &str = "domain.Product";

/// Schema name of an order in the generated Swagger document.
pub const ORDER_SCHEMA: &str = "domain.Order";

/// A Swagger 2 document shaped like the one the order service serves.
///
/// `valueobject.Money` is serialized as a bare number.
#[must_use]
pub fn sample_swagger() -> Value {
    json!({
        "swagger": "2.0",
        "info": {"title": "Order Service API", "version": "1.0"},
        "paths": {},
        "definitions": {
            "domain.Product": {
                "type": "object",
                "required": ["id", "sku", "name", "price"],
                "properties": {
                    "id": {"type": "integer"},
                    "sku": {"type": "string"},
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "price": {"$ref": "#/definitions/valueobject.Money"},
                    "total_qty": {"type": "integer"},
                    "reserved_qty": {"type": "integer"},
                    "is_active": {"type": "boolean"},
                    "created_at": {"type": "string"},
                    "updated_at": {"type": "string"}
                }
            },
            "domain.Order": {
                "type": "object",
                "required": ["id", "user_id", "product_id", "quantity", "total_price"],
                "properties": {
                    "id": {"type": "integer"},
                    "user_id": {"type": "integer"},
                    "product_id": {"type": "integer"},
                    "product_name": {"type": "string"},
                    "unit_price": {"$ref": "#/definitions/valueobject.Money"},
                    "quantity": {"type": "integer"},
                    "total_price": {"$ref": "#/definitions/valueobject.Money"},
                    "order_status": {"$ref": "#/definitions/domain.OrderStatus"},
                    "payment_status": {"$ref": "#/definitions/domain.PaymentStatus"},
                    "created_at": {"type": "string"}
                }
            },
            "domain.OrderStatus": {
                "type": "string",
                "enum": ["PENDING", "COMPLETED", "CANCELLED"]
            },
            "domain.PaymentStatus": {
                "type": "string",
                "enum": ["PENDING", "PAID", "FAILED"]
            },
            "valueobject.Money": {
                "type": "number"
            },
            "http.CreateOrderRequest": {
                "type": "object",
                "properties": {
                    "user_id": {"type": "integer"},
                    "product_id": {"type": "integer"},
                    "quantity": {"type": "integer"}
                }
            }
        }
    })
}

/// [`sample_swagger`] loaded into a store.
#[must_use]
pub fn sample_store() -> SchemaStore {
    match SchemaStore::from_value(&sample_swagger()) {
        Ok(store) => store,
        Err(err) => panic!("sample swagger document must load: {err}"),
    }
}

/// A product body as returned by `GET /products/{id}`.
#[must_use]
pub fn sample_product(id: i64) -> Value {
    json!({
        "id": id,
        "sku": format!("SKU-{id:04}"),
        "name": "Load Test Product",
        "description": "",
        "price": 10.5,
        "total_qty": 100,
        "reserved_qty": 0,
        "is_active": true,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

/// An order body as returned by `GET /orders/{id}`.
#[must_use]
pub fn sample_order(id: i64, product_id: i64) -> Value {
    json!({
        "id": id,
        "user_id": 42,
        "product_id": product_id,
        "product_name": "Load Test Product",
        "unit_price": 10.5,
        "quantity": 2,
        "total_price": 21.0,
        "order_status": "PENDING",
        "payment_status": "PENDING",
        "created_at": "2024-01-01T00:00:00Z"
    })
}
