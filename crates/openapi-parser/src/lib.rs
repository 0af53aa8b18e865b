//! # paystack-openapi
//!
//! OpenAPI 3.x compiler for the Paystack MCP server.
//! Loads a local OpenAPI document, resolves schema references and flattens
//! every documented operation into an [`Operation`] record keyed by
//! operation id.

mod compiler;
mod error;
mod loader;
mod parser;
mod resolver;
mod table;
mod types;

pub use compiler::OperationCompiler;
pub use error::{ParseError, ParseResult};
pub use loader::DocumentLoader;
pub use parser::OpenApiParser;
pub use resolver::SchemaResolver;
pub use table::OperationTable;
pub use types::*;
