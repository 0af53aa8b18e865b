//! `get_paystack_operation_guided`: let the client's model pick the operation

use std::sync::Arc;

use async_trait::async_trait;
use paystack_openapi::OpenApiParser;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{parse_arguments, pretty, Tool};
use crate::protocol::{ClientPeer, McpError, McpInputSchema, McpTool, ToolCallResult};

const NAME: &str = "get_paystack_operation_guided";

/// Token cap for the sampled answer
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Default, Deserialize)]
struct Arguments {
    #[serde(default)]
    query: Option<String>,
}

/// Resolves a free-text request to an operation through client sampling
pub struct GetPaystackOperationGuided {
    parser: Arc<OpenApiParser>,
}

impl GetPaystackOperationGuided {
    pub fn new(parser: Arc<OpenApiParser>) -> Self {
        Self { parser }
    }

    fn prompt(&self, query: Option<&str>) -> String {
        let ids: Vec<&str> = self.parser.operation_ids().collect();
        let mut prompt = format!(
            "Review the Paystack OpenAPI operations and infer the operationId that matches \
             the user's request. For example, 'I want to create a new customer in Paystack.' \
             maps to 'customer_create'. Reply with the operationId only.\n\n\
             Available operations: {}",
            ids.join(", ")
        );
        if let Some(query) = query {
            prompt.push_str("\n\nUser request: ");
            prompt.push_str(query);
        }
        prompt
    }
}

/// Operation id out of a `sampling/createMessage` result, if the reply is text
fn sampled_operation_id(reply: &Value) -> Option<&str> {
    let content = reply.get("content")?;
    if content.get("type")?.as_str()? != "text" {
        return None;
    }

    let id = content
        .get("text")?
        .as_str()?
        .trim()
        .trim_matches(|c: char| c == '`' || c == '"' || c == '\'');
    (!id.is_empty()).then_some(id)
}

#[async_trait]
impl Tool for GetPaystackOperationGuided {
    fn name(&self) -> &str {
        NAME
    }

    fn definition(&self) -> McpTool {
        let mut properties = Map::new();
        properties.insert(
            "query".to_string(),
            json!({
                "type": "string",
                "description": "What the user wants to do, e.g. 'refund a transaction'"
            }),
        );

        McpTool {
            name: NAME.to_string(),
            description: Some("Get Paystack API operation details from user input".to_string()),
            input_schema: McpInputSchema {
                properties: Some(properties),
                ..Default::default()
            },
        }
    }

    async fn call(
        &self,
        arguments: Value,
        peer: &ClientPeer,
    ) -> Result<ToolCallResult, McpError> {
        let Arguments { query } = parse_arguments(arguments)?;

        if !peer.supports_sampling() {
            return Ok(ToolCallResult::error(
                "The connected client does not support sampling.",
            ));
        }

        let params = json!({
            "messages": [{
                "role": "user",
                "content": {"type": "text", "text": self.prompt(query.as_deref())}
            }],
            "maxTokens": MAX_TOKENS
        });

        let reply = match peer.request("sampling/createMessage", params).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Sampling failed: {}", e.message);
                return Ok(ToolCallResult::error("Operation with ID cannot be inferred."));
            }
        };

        let Some(operation_id) = sampled_operation_id(&reply) else {
            return Ok(ToolCallResult::text(
                "Could not infer operation ID from user input.",
            ));
        };

        debug!("Client inferred operation {}", operation_id);

        match self.parser.get_operation_by_id(operation_id) {
            Some(operation) => Ok(ToolCallResult::text(pretty(operation)?)),
            None => Ok(ToolCallResult::error(format!(
                "Operation with ID {} not found.",
                operation_id
            ))),
        }
    }
}
