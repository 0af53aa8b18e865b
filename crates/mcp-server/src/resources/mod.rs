//! Resources exposed over MCP

mod operation_list;
mod transactions;

use async_trait::async_trait;
use url::Url;

use crate::protocol::{McpError, McpResource, ResourceReadResult};

pub use operation_list::OperationList;
pub use transactions::TransactionsList;

/// A readable resource addressed by `paystack://` URIs
#[async_trait]
pub trait Resource: Send + Sync {
    /// Descriptor returned by `resources/list`
    fn definition(&self) -> McpResource;

    /// Whether this resource serves `uri`
    fn matches(&self, uri: &Url) -> bool;

    async fn read(&self, uri: &Url) -> Result<ResourceReadResult, McpError>;
}
