//! `list_transactions`: paginated transaction listing

use std::sync::Arc;

use async_trait::async_trait;
use paystack_client::PaystackClient;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{parse_arguments, pretty, Tool};
use crate::protocol::{ClientPeer, McpError, McpInputSchema, McpTool, ToolCallResult};

const NAME: &str = "list_transactions";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Arguments {
    per_page: Option<u32>,
    page: Option<u32>,
    status: Option<String>,
}

impl Arguments {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(per_page) = self.per_page {
            query.push(("perPage", per_page.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        query
    }
}

/// Lists transactions with optional pagination and status filter
pub struct ListTransactions {
    client: Arc<PaystackClient>,
}

impl ListTransactions {
    pub fn new(client: Arc<PaystackClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListTransactions {
    fn name(&self) -> &str {
        NAME
    }

    fn definition(&self) -> McpTool {
        let mut properties = Map::new();
        properties.insert(
            "perPage".to_string(),
            json!({
                "type": "number",
                "description": "Number of transactions per page (default: 50, max: 100)",
                "minimum": 1,
                "maximum": 100
            }),
        );
        properties.insert(
            "page".to_string(),
            json!({
                "type": "number",
                "description": "Page number to retrieve (default: 1)",
                "minimum": 1
            }),
        );
        properties.insert(
            "status".to_string(),
            json!({
                "type": "string",
                "description": "Filter by transaction status",
                "enum": ["success", "failed", "abandoned"]
            }),
        );

        McpTool {
            name: NAME.to_string(),
            description: Some(
                "List all transactions from Paystack. Supports pagination and filtering by \
                 status. Returns an array of transactions with details."
                    .to_string(),
            ),
            input_schema: McpInputSchema {
                properties: Some(properties),
                ..Default::default()
            },
        }
    }

    async fn call(
        &self,
        arguments: Value,
        _peer: &ClientPeer,
    ) -> Result<ToolCallResult, McpError> {
        let arguments: Arguments = parse_arguments(arguments)?;
        let query = arguments.query();

        info!("Listing transactions {:?}", query);

        match self.client.get("/transaction", &query).await {
            Ok(response) => Ok(ToolCallResult::text(pretty(&response.data)?)),
            Err(e) => Ok(ToolCallResult::error(e.to_string())),
        }
    }
}
