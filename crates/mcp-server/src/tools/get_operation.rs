//! `get_paystack_operation`: look up one compiled operation by id

use std::sync::Arc;

use async_trait::async_trait;
use paystack_openapi::OpenApiParser;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{parse_arguments, pretty, Tool};
use crate::protocol::{ClientPeer, McpError, McpInputSchema, McpTool, ToolCallResult};

const NAME: &str = "get_paystack_operation";

#[derive(Debug, Deserialize)]
struct Arguments {
    operation_id: String,
}

/// Returns the request shape of a Paystack endpoint
pub struct GetPaystackOperation {
    parser: Arc<OpenApiParser>,
}

impl GetPaystackOperation {
    pub fn new(parser: Arc<OpenApiParser>) -> Self {
        Self { parser }
    }

    fn description(&self) -> String {
        let ids: Vec<&str> = self.parser.operation_ids().collect();
        format!(
            "Get Paystack API operation details by operation ID. Available operations are: {}",
            ids.join(", ")
        )
    }
}

#[async_trait]
impl Tool for GetPaystackOperation {
    fn name(&self) -> &str {
        NAME
    }

    fn definition(&self) -> McpTool {
        let mut properties = Map::new();
        properties.insert(
            "operation_id".to_string(),
            json!({
                "type": "string",
                "description": "The operation ID of the Paystack API endpoint"
            }),
        );

        McpTool {
            name: NAME.to_string(),
            description: Some(self.description()),
            input_schema: McpInputSchema {
                properties: Some(properties),
                required: Some(vec!["operation_id".to_string()]),
                ..Default::default()
            },
        }
    }

    async fn call(
        &self,
        arguments: Value,
        _peer: &ClientPeer,
    ) -> Result<ToolCallResult, McpError> {
        let Arguments { operation_id } = parse_arguments(arguments)?;
        let operation_id = operation_id.trim();

        debug!("Looking up operation {}", operation_id);

        match self.parser.get_operation_by_id(operation_id) {
            Some(operation) => Ok(ToolCallResult::text(pretty(operation)?)),
            None => Ok(ToolCallResult::text(format!(
                "Operation with ID {} not found.",
                operation_id
            ))),
        }
    }
}
