//! Recursive contract validator.
//!
//! Checks a decoded JSON value against a named schema from a [`SchemaStore`]:
//! required-field presence, primitive type agreement for declared properties,
//! and recursion through `$ref` properties. Every violation is collected; a
//! failing field never stops sibling fields or sibling schemas from being
//! checked. Validation failure is always returned as data, never raised.
//!
//! This module provides:
//! - [`ContractValidator`] over a borrowed store, with a recursion ceiling
//! - [`ValidationResult`] carrying the verdict and ordered violations
//! - Whole-listing validation through `validate_items`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::errors::{Violation, ViolationKind};
use super::runtime_type::RuntimeType;
use super::schema::{PropertySpec, SchemaKind};
use super::store::SchemaStore;

const ROOT_PATH: &str = "$";

/// Tuning knobs for the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Maximum `$ref` nesting depth before failing closed.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

const fn default_max_depth() -> usize {
    32
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl ValidatorConfig {
    /// Creates the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the depth ceiling.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Verdict plus diagnostics for one validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Overall verdict.
    pub valid: bool,
    /// Violations in the order they were found.
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// Returns the verdict.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Diagnostic messages, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }

    /// Violations of one kind.
    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Folds another result into this one (logical AND of verdicts).
    pub fn merge(&mut self, other: Self) {
        self.valid &= other.valid;
        self.violations.extend(other.violations);
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        write!(f, "invalid ({} violation(s))", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

/// Validates values against the schemas of a borrowed [`SchemaStore`].
///
/// Holds no state between calls, so one validator (or many) can be used
/// from any number of tasks concurrently.
#[derive(Debug, Clone, Copy)]
pub struct ContractValidator<'a> {
    store: &'a SchemaStore,
    config: ValidatorConfig,
}

impl<'a> ContractValidator<'a> {
    /// Creates a validator with the default config.
    #[must_use]
    pub fn new(store: &'a SchemaStore) -> Self {
        Self {
            store,
            config: ValidatorConfig::default(),
        }
    }

    /// Replaces the config.
    #[must_use]
    pub const fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// The store this validator reads from.
    #[must_use]
    pub const fn store(&self) -> &'a SchemaStore {
        self.store
    }

    /// Validates `value` against the schema named `schema`.
    #[must_use]
    pub fn validate(&self, value: &Value, schema: &str) -> ValidationResult {
        let mut violations = Vec::new();
        let valid = self.check(value, schema, ROOT_PATH, 0, &mut violations);
        finish(schema, valid, violations)
    }

    /// Validates every element of an array body against `schema`.
    ///
    /// This is a caller-side convenience for list endpoints; it does not
    /// read `items` declarations from the document.
    #[must_use]
    pub fn validate_items(&self, value: &Value, schema: &str) -> ValidationResult {
        let mut violations = Vec::new();
        let valid = match value.as_array() {
            Some(items) => items.iter().enumerate().fold(true, |valid, (index, item)| {
                let path = format!("{ROOT_PATH}[{index}]");
                self.check(item, schema, &path, 0, &mut violations) && valid
            }),
            None => {
                violations.push(Violation::type_mismatch(
                    schema,
                    None,
                    ROOT_PATH,
                    RuntimeType::Array,
                    RuntimeType::of(value),
                ));
                false
            }
        };
        finish(schema, valid, violations)
    }

    fn check(
        &self,
        value: &Value,
        schema: &str,
        path: &str,
        depth: usize,
        out: &mut Vec<Violation>,
    ) -> bool {
        if depth > self.config.max_depth {
            out.push(Violation::depth_exceeded(schema, path, self.config.max_depth));
            return false;
        }

        let Some(definition) = self.store.lookup(schema) else {
            out.push(Violation::schema_not_found(schema, path));
            return false;
        };

        if !definition.is_structured() {
            let expected = match definition.kind {
                SchemaKind::Object => RuntimeType::Object,
                SchemaKind::String => RuntimeType::String,
                SchemaKind::OtherPrimitive(_) | SchemaKind::Unspecified => return true,
            };
            let actual = RuntimeType::of(value);
            if actual != expected {
                out.push(Violation::type_mismatch(schema, None, path, expected, actual));
                return false;
            }
            return true;
        }

        let fields = value.as_object();
        let mut valid = true;

        for name in &definition.required {
            if !fields.is_some_and(|fields| fields.contains_key(name)) {
                out.push(Violation::missing_required(schema, name, path));
                valid = false;
            }
        }

        let (Some(properties), Some(fields)) = (&definition.properties, fields) else {
            return valid;
        };

        // Sorted so diagnostics come out in a stable order.
        let mut declared: Vec<(&String, &PropertySpec)> = properties.iter().collect();
        declared.sort_unstable_by(|a, b| a.0.cmp(b.0));

        for (name, spec) in declared {
            let Some(field) = fields.get(name).filter(|field| !field.is_null()) else {
                continue;
            };
            let field_path = format!("{path}.{name}");

            match spec {
                PropertySpec::Ref(target) => {
                    valid &= self.check(field, target, &field_path, depth + 1, out);
                }
                PropertySpec::Typed(Some(expected)) => {
                    let actual = RuntimeType::of(field);
                    if !expected.accepts(actual) {
                        out.push(Violation::type_mismatch(
                            schema,
                            Some(name.as_str()),
                            &field_path,
                            expected,
                            actual,
                        ));
                        valid = false;
                    }
                }
                PropertySpec::Typed(None) => {}
            }
        }

        valid
    }
}

fn finish(schema: &str, valid: bool, violations: Vec<Violation>) -> ValidationResult {
    for violation in &violations {
        tracing::warn!(
            code = violation.code(),
            schema = %violation.schema,
            field = violation.field.as_deref().unwrap_or(""),
            path = %violation.path,
            "Contract violation: {}",
            violation.message
        );
    }
    tracing::debug!(schema, valid, violations = violations.len(), "Contract check finished");
    ValidationResult { valid, violations }
}

/// Validates `value` against `schema` using `store` with default settings.
#[must_use]
pub fn validate(value: &Value, schema: &str, store: &SchemaStore) -> ValidationResult {
    ContractValidator::new(store).validate(value, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store(definitions: Value) -> SchemaStore {
        SchemaStore::from_value(&json!({ "definitions": definitions })).unwrap()
    }

    fn catalog() -> SchemaStore {
        store(json!({
            "domain.Product": {
                "type": "object",
                "required": ["id", "sku", "price"],
                "properties": {
                    "id": {"type": "integer"},
                    "sku": {"type": "string"},
                    "price": {"type": "number"},
                    "is_active": {"type": "boolean"},
                    "tags": {"type": "array"},
                    "notes": {}
                }
            },
            "domain.Order": {
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": {"type": "integer"},
                    "product": {"$ref": "#/definitions/domain.Product"},
                    "buyer": {"$ref": "#/definitions/domain.Missing"}
                }
            }
        }))
    }

    #[test]
    fn test_unspecified_schema_accepts_anything() {
        let store = store(json!({"Anything": {}}));
        let validator = ContractValidator::new(&store);
        for value in [json!(null), json!(1), json!("s"), json!([1, 2]), json!({"a": 1})] {
            let result = validator.validate(&value, "Anything");
            assert!(result.is_valid(), "expected {value} to pass");
            assert!(result.violations.is_empty());
        }
    }

    #[test]
    fn test_other_primitive_kind_is_permissive() {
        let store = store(json!({"Amount": {"type": "number"}}));
        assert!(validate(&json!("not a number"), "Amount", &store).is_valid());
    }

    #[test]
    fn test_object_kind_without_properties() {
        let store = store(json!({"Blob": {"type": "object"}}));
        assert!(validate(&json!({"x": 1}), "Blob", &store).is_valid());

        let result = validate(&json!([1]), "Blob", &store);
        assert!(!result.is_valid());
        assert_eq!(result.violations[0].kind, ViolationKind::TypeMismatch);
        assert!(result.violations[0].message.contains("expected object, got array"));
    }

    #[test]
    fn test_string_kind_without_properties() {
        let store = store(json!({"Name": {"type": "string"}}));
        assert!(validate(&json!("bob"), "Name", &store).is_valid());
        assert!(!validate(&json!(12), "Name", &store).is_valid());
    }

    #[test]
    fn test_required_field_missing_then_present() {
        let store = store(json!({"Thing": {"required": ["f"]}}));

        let result = validate(&json!({"g": 1}), "Thing", &store);
        assert!(!result.is_valid());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].field.as_deref(), Some("f"));
        assert!(result.messages()[0].contains("'f'"));

        assert!(validate(&json!({"g": 1, "f": "anything"}), "Thing", &store).is_valid());
        assert!(validate(&json!({"f": [true]}), "Thing", &store).is_valid());
    }

    #[test]
    fn test_all_required_violations_collected() {
        let result = validate(&json!({}), "domain.Product", &catalog());
        assert!(!result.is_valid());
        let fields: Vec<_> = result
            .violations_of(ViolationKind::MissingRequiredField)
            .filter_map(|v| v.field.clone())
            .collect();
        assert_eq!(fields, vec!["id", "sku", "price"]);
    }

    #[test]
    fn test_integer_accepts_fractional_numbers() {
        let store = catalog();
        for id in [json!(5), json!(5.5)] {
            let body = json!({"id": id, "sku": "X", "price": 1.0});
            assert!(validate(&body, "domain.Product", &store).is_valid());
        }
    }

    #[test]
    fn test_type_mismatch_reports_expected_and_actual() {
        let body = json!({"id": "7", "sku": "X", "price": 1.0, "is_active": "yes"});
        let result = validate(&body, "domain.Product", &catalog());

        assert!(!result.is_valid());
        let messages = result.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("'id' expected integer, got string"));
        assert!(messages[1].contains("'is_active' expected boolean, got string"));
        assert_eq!(result.violations[0].path, "$.id");
    }

    #[test]
    fn test_array_and_object_are_distinct() {
        let body = json!({"id": 1, "sku": "X", "price": 1.0, "tags": {"a": 1}});
        let result = validate(&body, "domain.Product", &catalog());
        assert!(!result.is_valid());
        assert!(result.messages()[0].contains("expected array, got object"));
    }

    #[test]
    fn test_null_and_untyped_and_undeclared_fields_skipped() {
        let body = json!({
            "id": 1,
            "sku": "X",
            "price": null,
            "notes": {"free": "form"},
            "extra": [1, 2, 3]
        });
        assert!(validate(&body, "domain.Product", &catalog()).is_valid());
    }

    #[test]
    fn test_reference_recurses() {
        let store = catalog();
        let ok = json!({"id": 1, "product": {"id": 1, "sku": "X", "price": 1.0}});
        assert!(validate(&ok, "domain.Order", &store).is_valid());

        let bad = json!({"id": 1, "product": {"id": 1, "price": "free"}});
        let result = validate(&bad, "domain.Order", &store);
        assert!(!result.is_valid());
        let paths: Vec<_> = result.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["$.product", "$.product.price"]);
        assert!(result.violations.iter().all(|v| v.schema == "domain.Product"));
    }

    #[test]
    fn test_dangling_reference_fails_parent() {
        let body = json!({"id": 1, "buyer": {"name": "x"}});
        let result = validate(&body, "domain.Order", &catalog());

        assert!(!result.is_valid());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].kind, ViolationKind::SchemaNotFound);
        assert_eq!(result.violations[0].schema, "domain.Missing");
        assert_eq!(result.violations[0].path, "$.buyer");
    }

    #[test]
    fn test_empty_reference_target_is_dangling() {
        let store = store(json!({
            "Any": {},
            "Order": {"properties": {"buyer": {"$ref": "#/definitions/"}}}
        }));
        let result = validate(&json!({"buyer": 1}), "Order", &store);

        assert!(!result.is_valid());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].kind, ViolationKind::SchemaNotFound);
        assert_eq!(result.violations[0].path, "$.buyer");
    }

    #[test]
    fn test_unknown_schema_fails_without_further_checks() {
        let result = validate(&json!({}), "Nope", &catalog());
        assert!(!result.is_valid());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].kind, ViolationKind::SchemaNotFound);
    }

    #[test]
    fn test_suffix_resolution_in_validation() {
        let body = json!({"id": 1, "sku": "X", "price": 1.0});
        assert!(validate(&body, "Product", &catalog()).is_valid());
    }

    #[test]
    fn test_sibling_violations_all_surface() {
        let body = json!({"product": {"sku": 1}, "buyer": {}});
        let result = validate(&body, "domain.Order", &catalog());

        let kinds: Vec<_> = result.violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::MissingRequiredField, // order.id
                ViolationKind::SchemaNotFound,       // buyer
                ViolationKind::MissingRequiredField, // product.id
                ViolationKind::MissingRequiredField, // product.price
                ViolationKind::TypeMismatch,         // product.sku
            ]
        );
    }

    #[test]
    fn test_self_reference_terminates() {
        let store = store(json!({
            "A": {"type": "object", "properties": {"next": {"$ref": "#/definitions/A"}, "n": {"type": "integer"}}}
        }));

        assert!(validate(&json!({"n": 1}), "A", &store).is_valid());
        assert!(validate(&json!({"n": 1, "next": {"n": 2, "next": {"n": 3}}}), "A", &store).is_valid());
        assert!(!validate(&json!({"next": {"next": {"n": "x"}}}), "A", &store).is_valid());
    }

    #[test]
    fn test_mutual_reference_depth_ceiling_fails_closed() {
        let store = store(json!({
            "A": {"properties": {"b": {"$ref": "#/definitions/B"}}},
            "B": {"properties": {"a": {"$ref": "#/definitions/A"}}}
        }));
        let validator =
            ContractValidator::new(&store).with_config(ValidatorConfig::new().with_max_depth(2));

        let shallow = json!({"b": {"a": {}}});
        assert!(validator.validate(&shallow, "A").is_valid());

        let deep = json!({"b": {"a": {"b": {"a": {}}}}});
        let first = validator.validate(&deep, "A");
        assert!(!first.is_valid());
        assert_eq!(first.violations[0].kind, ViolationKind::DepthExceeded);
        assert_eq!(first.violations[0].path, "$.b.a.b");
        assert_eq!(first, validator.validate(&deep, "A"));
    }

    #[test]
    fn test_non_object_value_against_structured_schema() {
        let result = validate(&json!("just a string"), "domain.Product", &catalog());
        assert!(!result.is_valid());
        assert_eq!(result.violations.len(), 3);

        let store = store(json!({"Loose": {"properties": {"a": {"type": "string"}}}}));
        assert!(validate(&json!(42), "Loose", &store).is_valid());
    }

    #[test]
    fn test_validate_items() {
        let store = catalog();
        let validator = ContractValidator::new(&store);
        let body = json!([
            {"id": 1, "sku": "A", "price": 1.0},
            {"id": 2, "price": 2.0}
        ]);

        let result = validator.validate_items(&body, "domain.Product");
        assert!(!result.is_valid());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "$[1]");

        assert!(validator.validate_items(&json!([]), "domain.Product").is_valid());

        let not_array = validator.validate_items(&json!({}), "domain.Product");
        assert!(!not_array.is_valid());
        assert!(not_array.messages()[0].contains("expected array, got object"));
    }

    #[test]
    fn test_result_merge_and_display() {
        let store = catalog();
        let mut total = validate(&json!({"id": 1, "sku": "A", "price": 1}), "Product", &store);
        assert_eq!(total.to_string(), "valid");

        total.merge(validate(&json!({}), "Nope", &store));
        assert!(!total.is_valid());
        assert!(total.to_string().starts_with("invalid (1 violation(s))"));
    }

    #[test]
    fn test_concurrent_validation_over_shared_store() {
        let store = std::sync::Arc::new(catalog());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    let body = json!({"id": i, "sku": "S", "price": 1.5});
                    validate(&body, "domain.Product", &store).is_valid()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
