//! Tools exposed over MCP

mod get_operation;
mod get_operation_guided;
mod list_transactions;
mod make_request;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::protocol::{ClientPeer, McpError, McpTool, ToolCallResult};

pub use get_operation::GetPaystackOperation;
pub use get_operation_guided::GetPaystackOperationGuided;
pub use list_transactions::ListTransactions;
pub use make_request::MakePaystackRequest;

/// A callable tool: its protocol descriptor plus the handler behind it
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name clients use in `tools/call`
    fn name(&self) -> &str;

    /// Descriptor returned by `tools/list`
    fn definition(&self) -> McpTool;

    /// Run the tool. Upstream failures are reported inside the result;
    /// `Err` is reserved for malformed arguments. `peer` reaches the calling
    /// client for tools that need a round-trip such as sampling.
    async fn call(
        &self,
        arguments: Value,
        peer: &ClientPeer,
    ) -> Result<ToolCallResult, McpError>;
}

/// Decode tool arguments, treating a missing object as empty
pub(crate) fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, McpError> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| McpError::invalid_params(e.to_string()))
}

/// Pretty JSON for a tool or resource body
pub(crate) fn pretty<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string()))
}
