//! Error types for the OpenAPI compiler

use thiserror::Error;

/// Result type alias for loader operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Document loading error types
///
/// These never escape [`crate::OpenApiParser::parse`]; they are logged and the
/// operation table is left empty. [`crate::DocumentLoader`] returns them for
/// callers that want the strict behaviour.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read OpenAPI document {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid OpenAPI document: {0}")]
    InvalidFormat(String),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("Reference points outside the document: {0}")]
    ExternalReference(String),

    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),
}
