//! Contract validation of response payloads.
//!
//! This module provides:
//! - A schema store built from a specification document's definitions
//! - The recursive contract validator
//! - Violation types and codes

mod errors;
mod runtime_type;
mod schema;
mod store;
mod validator;

pub use errors::{codes, SpecLoadError, Violation, ViolationKind};
pub use runtime_type::RuntimeType;
pub use schema::{PrimitiveType, PropertySpec, SchemaDefinition, SchemaKind};
pub use store::SchemaStore;
pub use validator::{validate, ContractValidator, ValidationResult, ValidatorConfig};
