//! HTTP access to the services under test.
//!
//! This module provides:
//! - The [`HttpTransport`] seam and its `reqwest` implementation
//! - [`ApiClient`] with product and order endpoint wrappers
//! - Request payload types

mod api;
mod transport;

pub use api::{ApiClient, NewOrder, NewProduct, OrderApi, ProductApi, StockRequest, SPEC_DOCUMENT_PATH};
pub use transport::{ApiResponse, HttpRequest, HttpTransport, Method, ReqwestTransport};

#[cfg(test)]
pub(crate) use transport::MockHttpTransport;
