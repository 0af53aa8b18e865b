//! Read-only lookup table of compiled operations

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::Operation;

/// Operations keyed by operation id, in document declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationTable {
    operations: IndexMap<String, Operation>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an operation, returning the one it replaced
    pub(crate) fn insert(&mut self, id: String, operation: Operation) -> Option<Operation> {
        self.operations.insert(id, operation)
    }

    pub fn get(&self, id: &str) -> Option<&Operation> {
        self.operations.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operation)> {
        self.operations.iter().map(|(id, op)| (id.as_str(), op))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
