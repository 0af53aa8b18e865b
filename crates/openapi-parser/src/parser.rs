//! Main OpenAPI parser

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::compiler::OperationCompiler;
use crate::error::ParseResult;
use crate::loader::DocumentLoader;
use crate::table::OperationTable;
use crate::types::{Document, Operation};

/// Parses a local OpenAPI document into an [`OperationTable`].
///
/// Loading fails open: any error is logged and leaves the table empty, so a
/// broken document degrades the catalog instead of taking the host down.
/// Callers check [`OperationTable::is_empty`] rather than an error value.
pub struct OpenApiParser {
    /// Local path of the OpenAPI document
    spec_path: PathBuf,
    operations: OperationTable,
}

impl OpenApiParser {
    /// Create a parser for the document at `spec_path`. Nothing is read until
    /// [`parse`](Self::parse) is called.
    pub fn new(spec_path: impl Into<PathBuf>) -> Self {
        Self {
            spec_path: spec_path.into(),
            operations: OperationTable::new(),
        }
    }

    pub fn spec_path(&self) -> &Path {
        &self.spec_path
    }

    /// Load and compile the document, replacing the current table
    pub async fn parse(&mut self) {
        let result = DocumentLoader::load_file(&self.spec_path).await;
        self.install(result);
    }

    /// Same as [`parse`](Self::parse) for a document already in memory
    pub fn parse_content(&mut self, content: &str) {
        let result = DocumentLoader::load_str(content);
        self.install(result);
    }

    fn install(&mut self, result: ParseResult<Document>) {
        match result {
            Ok(document) => {
                self.operations = OperationCompiler::compile(&document);
                info!(
                    "Loaded {} operations from {}",
                    self.operations.len(),
                    self.spec_path.display()
                );
            }
            Err(e) => {
                error!(
                    "Error parsing OpenAPI spec {}: {}",
                    self.spec_path.display(),
                    e
                );
                self.operations = OperationTable::new();
            }
        }
    }

    /// Look up a single operation; `None` when the id is unknown
    pub fn get_operation_by_id(&self, operation_id: &str) -> Option<&Operation> {
        self.operations.get(operation_id)
    }

    /// The full operation table
    pub fn get_operations(&self) -> &OperationTable {
        &self.operations
    }

    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.operations.ids()
    }
}
