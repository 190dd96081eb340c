//! Canonical error records for equality assertions.
//!
//! Templating errors carry a mix of stable diagnostics (id, explanation,
//! nested errors) and environment-dependent noise (stacks, offsets, parse
//! indexes). [`canonicalize`] reduces a raised error and an expected record
//! to one `{name, message, properties}` shape so tests can compare them with
//! plain equality.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AssertionError;

mod canonicalize;

pub use canonicalize::{canonicalize, expect_to_throw};

/// Plain `{name, message, properties}` record used only for comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalError {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl CanonicalError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            properties: Map::new(),
        }
    }

    /// Build from a JSON object of properties; any other value yields none.
    pub fn from_value(name: impl Into<String>, message: impl Into<String>, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            message: message.into(),
            properties,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "message": self.message,
            "properties": self.properties,
        })
    }

    pub(crate) fn from_json(value: &Value) -> Result<Self, AssertionError> {
        serde_json::from_value(value.clone()).map_err(|err| {
            AssertionError::mismatch("expected error record is malformed", value, err)
        })
    }
}

/// Shape of the multi-error container the templating engine raises.
pub const MULTI_ERROR_NAME: &str = "TemplateError";
pub const MULTI_ERROR_MESSAGE: &str = "Multi error";
pub const MULTI_ERROR_ID: &str = "multi_error";

/// Wrap one or many expected errors into the multi-error container so single
/// and aggregated failures share one comparison shape.
pub fn wrap_multi_error<I>(errors: I) -> CanonicalError
where
    I: IntoIterator<Item = CanonicalError>,
{
    let errors: Vec<Value> = errors.into_iter().map(|err| err.to_value()).collect();
    CanonicalError::new(MULTI_ERROR_NAME, MULTI_ERROR_MESSAGE)
        .with_property("id", MULTI_ERROR_ID)
        .with_property("errors", errors)
}

/// An error as raised by a templating engine, before canonicalization.
#[derive(Debug)]
pub struct RaisedError {
    pub name: String,
    pub message: String,
    pub properties: Map<String, Value>,
    /// Sub-errors of a multi-error aggregate.
    pub errors: Vec<RaisedError>,
    /// Underlying cause, compared by message only.
    pub root_error: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub stack: Option<String>,
    pub line: Option<u32>,
    pub source_file: Option<String>,
}

impl RaisedError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            properties: Map::new(),
            errors: Vec::new(),
            root_error: None,
            stack: None,
            line: None,
            source_file: None,
        }
    }

    /// Aggregate several errors the way the engine reports them together.
    pub fn multi(errors: Vec<RaisedError>) -> Self {
        Self::new(MULTI_ERROR_NAME, MULTI_ERROR_MESSAGE)
            .with_property("id", MULTI_ERROR_ID)
            .with_property("explanation", "The template has multiple errors")
            .with_errors(errors)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<RaisedError>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_root_error(mut self, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.root_error = Some(Box::new(err));
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_location(mut self, source_file: impl Into<String>, line: u32) -> Self {
        self.source_file = Some(source_file.into());
        self.line = Some(line);
        self
    }
}

impl fmt::Display for RaisedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for RaisedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.root_error
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl From<CanonicalError> for RaisedError {
    fn from(record: CanonicalError) -> Self {
        let mut raised = RaisedError::new(record.name, record.message);
        raised.properties = record.properties;
        raised
    }
}

#[cfg(test)]
mod tests;
