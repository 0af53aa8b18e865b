//! Type definitions for compiled operations and the raw document they come from

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP methods supported by OpenAPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Look up a method by its path-item key (`get`, `post`, ...).
    ///
    /// Keys are matched exactly, as OpenAPI requires lowercase method keys.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            "post" => Some(HttpMethod::Post),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "patch" => Some(HttpMethod::Patch),
            "trace" => Some(HttpMethod::Trace),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A path or query parameter of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Declared parameters of an operation, split by location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    pub path_parameter: Vec<Parameter>,
    pub query_parameter: Vec<Parameter>,
}

/// A resolved body property.
///
/// `children` is only set for inlined nested objects and arrays, so a body is
/// always a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Field>>,
    /// Remaining schema keywords (`minimum`, `maxLength`, `nullable`, ...)
    #[serde(flatten)]
    pub constraints: Map<String, Value>,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        field_type: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            description: description.into(),
            required,
            format: None,
            allowed_values: None,
            example: None,
            items: None,
            children: None,
            constraints: Map::new(),
        }
    }

    /// Placeholder emitted when a schema refers back to one that is still
    /// being expanded.
    pub fn circular(name: &str) -> Self {
        Self::new(
            name,
            "object",
            format!("Circular reference to {}", name),
            false,
        )
    }

    pub fn with_children(mut self, children: Vec<Field>) -> Self {
        self.children = Some(children);
        self
    }
}

/// Flattened JSON request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub properties: Vec<Field>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub examples: Map<String, Value>,
}

impl Body {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.examples.is_empty()
    }
}

/// A single compiled API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// URL path (e.g., "/transaction/partial_debit")
    pub path: String,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only present when the operation declares a JSON request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Body>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_parameter: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_parameter: Option<Vec<Parameter>>,
}

// --- Raw OpenAPI 3.x structures for parsing ---

/// Parsed and dereferenced OpenAPI document
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub openapi: String,
    #[serde(default)]
    pub info: Option<RawInfo>,
    #[serde(default)]
    pub paths: IndexMap<String, RawPathItem>,
    #[serde(default)]
    pub components: RawComponents,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInfo {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub version: String,
}

/// Path item; every key other than `parameters` is kept in declaration order
/// and filtered for HTTP methods by the compiler.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPathItem {
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(flatten)]
    pub entries: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    pub request_body: Option<RawRequestBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "in", default)]
    pub location: String,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<Value>,
    pub example: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMediaType {
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComponents {
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
}
