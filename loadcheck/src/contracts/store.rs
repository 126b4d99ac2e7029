//! Schema store: the named definitions of one specification document.
//!
//! A store is built once from a Swagger 2 or OpenAPI 3 document and then
//! shared read-only by every validation call.
//!
//! This module provides:
//! - Loading from a parsed document, JSON text, or a file on disk
//! - Exact name lookup with a deterministic suffix fallback
//!   (`"domain.Product"` finds `"pkg.domain.Product"`)
//! - Listing of the loaded definition names

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use super::errors::SpecLoadError;
use super::schema::SchemaDefinition;

/// Immutable index over a specification document's schema definitions.
///
/// Built once at startup and shared read-only (typically behind an `Arc`)
/// by every validation call.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    definitions: HashMap<String, SchemaDefinition>,
}

impl SchemaStore {
    /// Builds a store from a parsed specification document.
    ///
    /// Reads Swagger 2 `definitions`, falling back to OpenAPI 3
    /// `components.schemas`.
    pub fn from_value(document: &Value) -> Result<Self, SpecLoadError> {
        let section = document
            .get("definitions")
            .or_else(|| document.pointer("/components/schemas"))
            .and_then(Value::as_object)
            .ok_or(SpecLoadError::MissingDefinitions)?;

        let definitions: HashMap<String, SchemaDefinition> = section
            .iter()
            .map(|(name, raw)| (name.clone(), SchemaDefinition::from_value(raw)))
            .collect();

        tracing::debug!(schemas = definitions.len(), "Loaded schema definitions");
        Ok(Self { definitions })
    }

    /// Builds a store from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SpecLoadError> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_value(&document)
    }

    /// Reads and parses a specification document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SpecLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Builds a store directly from definitions (mainly for tests).
    #[must_use]
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = (String, SchemaDefinition)>,
    ) -> Self {
        Self {
            definitions: definitions.into_iter().collect(),
        }
    }

    /// Looks up a schema by exact name, then by suffix.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&SchemaDefinition> {
        self.resolve(name).map(|(_, definition)| definition)
    }

    /// Like [`lookup`](Self::lookup) but also returns the matched key.
    ///
    /// When several keys end with `name`, the shortest key wins and ties go
    /// to the lexicographically smallest, so the result never depends on map
    /// iteration order. An empty name never matches by suffix.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<(&str, &SchemaDefinition)> {
        if let Some((key, definition)) = self.definitions.get_key_value(name) {
            return Some((key.as_str(), definition));
        }
        if name.is_empty() {
            return None;
        }

        self.definitions
            .iter()
            .filter(|(key, _)| key.ends_with(name))
            .min_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .map(|(key, definition)| (key.as_str(), definition))
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if the document declared no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Sorted definition names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::schema::SchemaKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    fn store() -> SchemaStore {
        SchemaStore::from_value(&json!({
            "definitions": {
                "pkg.domain.Product": {"type": "object", "required": ["id"]},
                "domain.Order": {"type": "object"},
                "Name": {"type": "string"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_exact_lookup() {
        let store = store();
        let def = store.lookup("Name").unwrap();
        assert_eq!(def.kind, SchemaKind::String);
    }

    #[test]
    fn test_suffix_lookup() {
        let store = store();
        let (key, def) = store.resolve("domain.Product").unwrap();
        assert_eq!(key, "pkg.domain.Product");
        assert_eq!(def.required, vec!["id".to_string()]);
        assert_eq!(store.resolve("Product").unwrap().0, "pkg.domain.Product");
    }

    #[test]
    fn test_lookup_not_found() {
        assert!(store().lookup("Customer").is_none());
    }

    #[test]
    fn test_empty_name_never_matches_by_suffix() {
        assert!(store().resolve("").is_none());

        let empty = SchemaDefinition::from_value(&json!({}));
        let keyed = SchemaStore::from_definitions([(String::new(), empty)]);
        assert_eq!(keyed.resolve("").unwrap().0, "");
    }

    #[test]
    fn test_suffix_tie_break_is_deterministic() {
        let store = SchemaStore::from_value(&json!({
            "definitions": {
                "internal.v2.Item": {"type": "string"},
                "api.Item": {"type": "object"},
                "zzz.Item": {"type": "number"}
            }
        }))
        .unwrap();

        for _ in 0..10 {
            assert_eq!(store.resolve("Item").unwrap().0, "api.Item");
        }
    }

    #[test]
    fn test_exact_match_beats_shorter_suffix() {
        let store = SchemaStore::from_value(&json!({
            "definitions": {
                "a.Item": {"type": "object"},
                "b.a.Item": {"type": "string"}
            }
        }))
        .unwrap();
        assert_eq!(store.resolve("b.a.Item").unwrap().0, "b.a.Item");
    }

    #[test]
    fn test_missing_definitions_is_fatal() {
        let err = SchemaStore::from_value(&json!({"swagger": "2.0"})).unwrap_err();
        assert!(matches!(err, SpecLoadError::MissingDefinitions));

        let err = SchemaStore::from_value(&json!({"definitions": []})).unwrap_err();
        assert!(matches!(err, SpecLoadError::MissingDefinitions));
    }

    #[test]
    fn test_openapi3_components_fallback() {
        let store = SchemaStore::from_value(&json!({
            "openapi": "3.0.0",
            "components": {"schemas": {"Pet": {"type": "object"}}}
        }))
        .unwrap();
        assert_eq!(store.names(), vec!["Pet"]);
    }

    #[test]
    fn test_from_json_str_parse_error() {
        let err = SchemaStore::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, SpecLoadError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"definitions": {{"A": {{}}, "B": {{}}}}}}"#).unwrap();

        let store = SchemaStore::from_path(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.names(), vec!["A", "B"]);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = SchemaStore::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SpecLoadError::Io { .. }));
    }
}
