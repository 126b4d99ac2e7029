//! Testing utilities.
//!
//! This module provides:
//! - A sample Swagger document and response bodies
//! - A scripted [`StubTransport`] that records requests
//! - Assertions for validation results and run summaries

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_check_failed, assert_check_passed, assert_contract_valid, assert_violation,
};
pub use fixtures::{
    sample_order, sample_product, sample_store, sample_swagger, ORDER_SCHEMA, PRODUCT_SCHEMA,
};
pub use mocks::StubTransport;
