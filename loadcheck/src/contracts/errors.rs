//! Violation taxonomy and spec-loading errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of contract violation found while validating a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The requested schema has no exact or suffix match in the store.
    SchemaNotFound,
    /// A required property is absent from the value.
    MissingRequiredField,
    /// A present property's runtime type disagrees with its declared type.
    TypeMismatch,
    /// Reference nesting went past the configured depth ceiling.
    DepthExceeded,
}

impl ViolationKind {
    /// Stable identifier for reports and log filtering.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SchemaNotFound => codes::SCHEMA_NOT_FOUND,
            Self::MissingRequiredField => codes::MISSING_REQUIRED,
            Self::TypeMismatch => codes::TYPE_MISMATCH,
            Self::DepthExceeded => codes::DEPTH_EXCEEDED,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SchemaNotFound => "schema not found",
            Self::MissingRequiredField => "missing required field",
            Self::TypeMismatch => "type mismatch",
            Self::DepthExceeded => "reference depth exceeded",
        };
        f.write_str(label)
    }
}

/// A single contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// What went wrong.
    pub kind: ViolationKind,
    /// Schema name the check was performed against (as requested).
    pub schema: String,
    /// Offending field, when the violation concerns a property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Location inside the validated value, e.g. `$.product.price`.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    pub(crate) fn schema_not_found(schema: &str, path: &str) -> Self {
        Self {
            kind: ViolationKind::SchemaNotFound,
            schema: schema.to_string(),
            field: None,
            path: path.to_string(),
            message: format!("schema '{schema}' not found"),
        }
    }

    pub(crate) fn missing_required(schema: &str, field: &str, path: &str) -> Self {
        Self {
            kind: ViolationKind::MissingRequiredField,
            schema: schema.to_string(),
            field: Some(field.to_string()),
            path: path.to_string(),
            message: format!("schema '{schema}': missing required field '{field}'"),
        }
    }

    pub(crate) fn type_mismatch(
        schema: &str,
        field: Option<&str>,
        path: &str,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        let message = match field {
            Some(field) => format!(
                "schema '{schema}': field '{field}' expected {expected}, got {actual}"
            ),
            None => format!("schema '{schema}': expected {expected}, got {actual}"),
        };
        Self {
            kind: ViolationKind::TypeMismatch,
            schema: schema.to_string(),
            field: field.map(str::to_string),
            path: path.to_string(),
            message,
        }
    }

    pub(crate) fn depth_exceeded(schema: &str, path: &str, max_depth: usize) -> Self {
        Self {
            kind: ViolationKind::DepthExceeded,
            schema: schema.to_string(),
            field: None,
            path: path.to_string(),
            message: format!(
                "schema '{schema}': reference nesting exceeds {max_depth} levels"
            ),
        }
    }

    /// Stable code for this violation's kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (at {})", self.code(), self.message, self.path)
    }
}

/// Error raised when a specification document cannot back a schema store.
///
/// These are fatal at startup; per-payload problems are [`Violation`]s.
#[derive(Debug, Error)]
pub enum SpecLoadError {
    /// The document has no `definitions` (or `components.schemas`) object.
    #[error("specification document has no definitions section")]
    MissingDefinitions,

    /// The document could not be read.
    #[error("failed to read specification document '{path}': {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON.
    #[error("specification document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Contract violation codes.
pub mod codes {
    /// Schema name did not resolve.
    pub const SCHEMA_NOT_FOUND: &str = "CONTRACT-001-SCHEMA_NOT_FOUND";
    /// Required field absent.
    pub const MISSING_REQUIRED: &str = "CONTRACT-002-MISSING_REQUIRED";
    /// Declared and runtime types disagree.
    pub const TYPE_MISMATCH: &str = "CONTRACT-003-TYPE_MISMATCH";
    /// Reference chain too deep or cyclic.
    pub const DEPTH_EXCEEDED: &str = "CONTRACT-004-DEPTH";
}
