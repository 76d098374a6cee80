//! Core wire types for the gateway.
//!
//! Payloads that belong to the editor (graphs, commands, reply data) stay
//! opaque `serde_json::Value`s; only the envelopes are typed here.

use crate::domain::correlation::CorrelationId;
use crate::domain::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

// ============================================================================
// Correlated exchange result
// ============================================================================

/// Result frame of one correlated exchange.
///
/// Serializes as `{"request_id": .., "status": "ok", "data": ..}` or
/// `{"request_id": .., "status": "error", "message": ..}`. `request_id` is
/// omitted when the request carried none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeReply {
    /// Echoed correlation identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<CorrelationId>,
    /// Success payload or failure message
    #[serde(flatten)]
    pub outcome: ExchangeOutcome,
}

/// Outcome half of an [`ExchangeReply`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExchangeOutcome {
    /// The remote answered in time
    Ok {
        /// Reply payload (`null` when the remote sent none)
        data: Value,
    },
    /// The exchange failed
    Error {
        /// Human-readable reason
        message: String,
    },
}

impl ExchangeReply {
    /// Successful exchange
    pub fn ok(request_id: CorrelationId, data: Value) -> Self {
        Self {
            request_id: Some(request_id),
            outcome: ExchangeOutcome::Ok { data },
        }
    }

    /// Failed exchange
    pub fn error(request_id: Option<CorrelationId>, message: impl Into<String>) -> Self {
        Self {
            request_id,
            outcome: ExchangeOutcome::Error {
                message: message.into(),
            },
        }
    }

    /// Failed exchange built from a taxonomy error
    pub fn from_error(request_id: Option<CorrelationId>, err: &BridgeError) -> Self {
        Self::error(request_id, err.to_string())
    }

    /// Check whether the exchange succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ExchangeOutcome::Ok { .. })
    }

    /// Failure message, if any
    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            ExchangeOutcome::Error { message } => Some(message),
            ExchangeOutcome::Ok { .. } => None,
        }
    }

    /// Encode as a text frame
    pub fn to_frame(&self) -> String {
        // Value-only structure, serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ============================================================================
// Batch broadcast report
// ============================================================================

/// Per-item failure in a batch broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemError {
    /// Position of the item in the submitted list
    pub index: usize,
    /// Why the item was skipped
    pub error: String,
}

/// Partial-failure report of a batch broadcast.
///
/// `ok` is always true: malformed items are reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Always true
    pub ok: bool,
    /// Number of items published
    pub count: usize,
    /// Items that were skipped
    pub errors: Vec<BatchItemError>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            ok: true,
            count: 0,
            errors: Vec::new(),
        }
    }

    pub fn published(&mut self) {
        self.count += 1;
    }

    pub fn skipped(&mut self, index: usize, error: impl Into<String>) {
        self.errors.push(BatchItemError {
            index,
            error: error.into(),
        });
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Required fields
// ============================================================================

/// Check whether a JSON field counts as missing.
///
/// Absent, `null`, `""`, `[]` and `{}` are all missing.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

/// Get a required field or fail with `missing field: <name>`.
pub fn required_field<'a>(body: &'a Value, name: &str) -> Result<&'a Value, BridgeError> {
    let value = body.get(name);
    if is_missing(value) {
        return Err(BridgeError::missing_field(name));
    }
    value.ok_or_else(|| BridgeError::missing_field(name))
}

/// Get a field that only has to be present; any value, `null` included, counts.
pub fn required_key<'a>(body: &'a Value, name: &str) -> Result<&'a Value, BridgeError> {
    body.get(name).ok_or_else(|| BridgeError::missing_field(name))
}

// ============================================================================
// Persisted document names
// ============================================================================

/// Filename of a persisted graph document.
///
/// Only bare names are accepted: the name must equal its own final path
/// component, so separators, `.` and `..` are all rejected before any store
/// is touched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentName(String);

impl DocumentName {
    /// Validate a requested filename.
    pub fn parse(name: &str) -> Result<Self, BridgeError> {
        if name.is_empty() {
            return Err(BridgeError::missing_field("filename"));
        }

        let bare = Path::new(name)
            .file_name()
            .map(|base| base == name)
            .unwrap_or(false);

        // Backslash is a separator on Windows hosts even where Path disagrees
        if !bare || name.contains('\\') || name.contains('\0') {
            return Err(BridgeError::MalformedInput(
                "invalid filename: path traversal".into(),
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Read and validate the `filename` field of a request body
    pub fn from_body(body: &Value) -> Result<Self, BridgeError> {
        match required_field(body, "filename")? {
            Value::String(name) => Self::parse(name),
            _ => Err(BridgeError::MalformedInput(
                "filename must be a string".into(),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Node type descriptors
// ============================================================================

/// Compact descriptor returned by the node type listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    /// Input sections as the registry reports them (`required`, `optional`)
    pub input: Value,
    /// Output type names
    pub output: Vec<Value>,
    /// Category path, e.g. `"loaders"` or `"sampling/custom"`
    pub category: String,
}

/// One named input of a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Value,
}

/// Verbose descriptor returned by the all-nodes listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDetail {
    pub description: String,
    pub category: String,
    pub inputs: Vec<NodeInput>,
    pub outputs: Vec<Value>,
}

/// Input sections flattened into the verbose listing, in this order
const INPUT_SECTIONS: [&str; 2] = ["required", "optional"];

/// Reasons a raw registry descriptor could not be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("descriptor is not an object")]
    NotAnObject,
    #[error("field {0} has the wrong type")]
    WrongType(&'static str),
    #[error("input {0} has no type")]
    UntypedInput(String),
}

fn string_field(raw: &Map<String, Value>, name: &'static str) -> Result<String, DescriptorError> {
    match raw.get(name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DescriptorError::WrongType(name)),
    }
}

fn output_field(raw: &Map<String, Value>) -> Result<Vec<Value>, DescriptorError> {
    match raw.get("output") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(_) => Err(DescriptorError::WrongType("output")),
    }
}

fn input_field(raw: &Map<String, Value>) -> Result<Map<String, Value>, DescriptorError> {
    match raw.get("input") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(sections)) => Ok(sections.clone()),
        Some(_) => Err(DescriptorError::WrongType("input")),
    }
}

impl NodeSummary {
    /// Placeholder for a descriptor that could not be read
    pub fn empty() -> Self {
        Self {
            input: Value::Object(Map::new()),
            output: Vec::new(),
            category: String::new(),
        }
    }

    /// Category of a raw descriptor, read independently of its other fields.
    ///
    /// Missing or `null` reads as `""`; `None` when the descriptor is not an
    /// object or the category is not a string.
    pub fn raw_category(raw: &Value) -> Option<&str> {
        match raw.as_object()?.get("category") {
            None | Some(Value::Null) => Some(""),
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => None,
        }
    }

    /// Read a raw registry descriptor.
    pub fn extract(raw: &Value) -> Result<Self, DescriptorError> {
        let raw = raw.as_object().ok_or(DescriptorError::NotAnObject)?;
        Ok(Self {
            input: Value::Object(input_field(raw)?),
            output: output_field(raw)?,
            category: string_field(raw, "category")?,
        })
    }

    /// Read a raw descriptor, degrading to empty fields on failure
    pub fn extract_or_empty(raw: &Value) -> Self {
        Self::extract(raw).unwrap_or_else(|_| Self::empty())
    }
}

impl NodeDetail {
    /// Placeholder for a descriptor that could not be read
    pub fn empty() -> Self {
        Self {
            description: String::new(),
            category: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Read a raw registry descriptor.
    ///
    /// Inputs from the `required` and `optional` sections are flattened in
    /// that order. An input declared as a list takes its first element as
    /// its type; any other declaration is used as-is, with non-strings
    /// rendered as JSON text.
    pub fn extract(raw: &Value) -> Result<Self, DescriptorError> {
        let raw = raw.as_object().ok_or(DescriptorError::NotAnObject)?;
        let sections = input_field(raw)?;

        let mut inputs = Vec::new();
        for section in INPUT_SECTIONS {
            let Some(declared) = sections.get(section) else {
                continue;
            };
            let declared = declared
                .as_object()
                .ok_or(DescriptorError::WrongType("input"))?;

            for (name, decl) in declared {
                let kind = match decl {
                    Value::Array(parts) => parts
                        .first()
                        .cloned()
                        .ok_or_else(|| DescriptorError::UntypedInput(name.clone()))?,
                    Value::String(s) => Value::String(s.clone()),
                    other => Value::String(other.to_string()),
                };
                inputs.push(NodeInput {
                    name: name.clone(),
                    kind,
                });
            }
        }

        Ok(Self {
            description: string_field(raw, "description")?,
            category: string_field(raw, "category")?,
            inputs,
            outputs: output_field(raw)?,
        })
    }

    /// Read a raw descriptor, degrading to empty fields on failure
    pub fn extract_or_empty(raw: &Value) -> Self {
        Self::extract(raw).unwrap_or_else(|_| Self::empty())
    }
}
