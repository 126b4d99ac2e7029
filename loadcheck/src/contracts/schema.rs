//! Schema model parsed from specification `definitions` entries.
//!
//! Parsing is lenient: anything this model does not understand degrades to
//! "absent" rather than failing, so a partially-described schema still
//! validates what it can.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use super::runtime_type::RuntimeType;

const REF_PREFIXES: [&str; 2] = ["#/definitions/", "#/components/schemas/"];

/// A declared primitive `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer` (checked as any number)
    Integer,
    /// `boolean`
    Boolean,
    /// `object`
    Object,
    /// `array`
    Array,
}

impl PrimitiveType {
    /// Parses a `type` tag. Unknown tags yield `None`.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    /// Whether a value of runtime type `actual` satisfies this declared type.
    ///
    /// `integer` and `number` are the same bucket at this layer.
    #[must_use]
    pub const fn accepts(self, actual: RuntimeType) -> bool {
        matches!(
            (self, actual),
            (Self::String, RuntimeType::String)
                | (Self::Number | Self::Integer, RuntimeType::Number)
                | (Self::Boolean, RuntimeType::Boolean)
                | (Self::Object, RuntimeType::Object)
                | (Self::Array, RuntimeType::Array)
        )
    }

    /// Tag as written in the specification document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse kind of a schema definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// `type: object`
    Object,
    /// `type: string`
    String,
    /// Any other recognised primitive type.
    OtherPrimitive(PrimitiveType),
    /// No (or an unrecognised) `type` entry.
    Unspecified,
}

impl SchemaKind {
    fn from_type(ty: Option<PrimitiveType>) -> Self {
        match ty {
            Some(PrimitiveType::Object) => Self::Object,
            Some(PrimitiveType::String) => Self::String,
            Some(other) => Self::OtherPrimitive(other),
            None => Self::Unspecified,
        }
    }
}

/// How a single property is described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySpec {
    /// Points at another named schema.
    Ref(String),
    /// Directly typed; `None` means untyped (any value).
    Typed(Option<PrimitiveType>),
}

impl PropertySpec {
    /// Parses a property entry. A `$ref` takes precedence over `type`.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        if let Some(reference) = value.get("$ref").and_then(Value::as_str) {
            return Self::Ref(ref_target(reference).to_string());
        }
        Self::Typed(parse_type(value))
    }
}

/// One named schema definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefinition {
    /// Declared kind.
    pub kind: SchemaKind,
    /// Declared properties, when the definition has a `properties` object.
    pub properties: Option<HashMap<String, PropertySpec>>,
    /// Names that must be present on a conforming value.
    pub required: Vec<String>,
}

impl SchemaDefinition {
    /// Parses a definition entry. Never fails.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let properties = value
            .get("properties")
            .and_then(Value::as_object)
            .map(parse_properties);

        let required = value
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            kind: SchemaKind::from_type(parse_type(value)),
            properties,
            required,
        }
    }

    /// True when the definition carries structural information
    /// (declared properties or required names).
    #[must_use]
    pub fn is_structured(&self) -> bool {
        self.properties.is_some() || !self.required.is_empty()
    }
}

fn parse_properties(map: &Map<String, Value>) -> HashMap<String, PropertySpec> {
    map.iter()
        .map(|(name, spec)| (name.clone(), PropertySpec::from_value(spec)))
        .collect()
}

fn parse_type(value: &Value) -> Option<PrimitiveType> {
    let tag = value.get("type")?.as_str()?;
    let parsed = PrimitiveType::parse(tag);
    if parsed.is_none() {
        tracing::debug!(type_tag = tag, "Unrecognised type tag treated as untyped");
    }
    parsed
}

/// Reduces a `$ref` pointer to the bare schema name.
pub(crate) fn ref_target(reference: &str) -> &str {
    REF_PREFIXES
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))
        .unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_primitive_accepts_integer_as_number() {
        assert!(PrimitiveType::Integer.accepts(RuntimeType::Number));
        assert!(PrimitiveType::Number.accepts(RuntimeType::Number));
        assert!(!PrimitiveType::Integer.accepts(RuntimeType::String));
        assert!(!PrimitiveType::Object.accepts(RuntimeType::Array));
        assert!(!PrimitiveType::Array.accepts(RuntimeType::Object));
    }

    #[test]
    fn test_property_spec_ref_wins_over_type() {
        let spec = PropertySpec::from_value(&json!({
            "$ref": "#/definitions/domain.Product",
            "type": "object"
        }));
        assert_eq!(spec, PropertySpec::Ref("domain.Product".to_string()));
    }

    #[test]
    fn test_property_spec_untyped_and_unknown() {
        assert_eq!(
            PropertySpec::from_value(&json!({"description": "anything"})),
            PropertySpec::Typed(None)
        );
        assert_eq!(
            PropertySpec::from_value(&json!({"type": "file"})),
            PropertySpec::Typed(None)
        );
    }

    #[test]
    fn test_ref_target_prefixes() {
        assert_eq!(ref_target("#/definitions/Order"), "Order");
        assert_eq!(ref_target("#/components/schemas/Order"), "Order");
        assert_eq!(ref_target("Order"), "Order");
    }

    #[test]
    fn test_definition_parsing() {
        let def = SchemaDefinition::from_value(&json!({
            "type": "object",
            "required": ["id", 7, "sku"],
            "properties": {
                "id": {"type": "integer"},
                "owner": {"$ref": "#/definitions/User"}
            }
        }));

        assert_eq!(def.kind, SchemaKind::Object);
        assert_eq!(def.required, vec!["id".to_string(), "sku".to_string()]);
        let props = def.properties.as_ref().unwrap();
        assert_eq!(props["id"], PropertySpec::Typed(Some(PrimitiveType::Integer)));
        assert_eq!(props["owner"], PropertySpec::Ref("User".to_string()));
        assert!(def.is_structured());
    }

    #[test]
    fn test_definition_kinds() {
        assert_eq!(
            SchemaDefinition::from_value(&json!({"type": "string"})).kind,
            SchemaKind::String
        );
        assert_eq!(
            SchemaDefinition::from_value(&json!({"type": "number"})).kind,
            SchemaKind::OtherPrimitive(PrimitiveType::Number)
        );
        let empty = SchemaDefinition::from_value(&json!({}));
        assert_eq!(empty.kind, SchemaKind::Unspecified);
        assert!(!empty.is_structured());
    }

    #[test]
    fn test_malformed_sections_degrade_to_absent() {
        let def = SchemaDefinition::from_value(&json!({
            "type": 3,
            "properties": ["not", "a", "map"],
            "required": "id"
        }));
        assert_eq!(def.kind, SchemaKind::Unspecified);
        assert!(def.properties.is_none());
        assert!(def.required.is_empty());
    }
}
