//! `make_paystack_request`: forward a request to the Paystack API

use std::sync::Arc;

use async_trait::async_trait;
use paystack_client::PaystackClient;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{parse_arguments, pretty, Tool};
use crate::protocol::{ClientPeer, McpError, McpInputSchema, McpTool, ToolCallResult};

const NAME: &str = "make_paystack_request";

#[derive(Debug, Deserialize)]
struct Arguments {
    request: RequestArguments,
}

#[derive(Debug, Deserialize)]
struct RequestArguments {
    method: String,
    path: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Sends an arbitrary request built from an operation's details
pub struct MakePaystackRequest {
    client: Arc<PaystackClient>,
}

impl MakePaystackRequest {
    pub fn new(client: Arc<PaystackClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for MakePaystackRequest {
    fn name(&self) -> &str {
        NAME
    }

    fn definition(&self) -> McpTool {
        let mut properties = Map::new();
        properties.insert(
            "request".to_string(),
            json!({
                "type": "object",
                "properties": {
                    "method": {
                        "type": "string",
                        "description": "HTTP method of the API request"
                    },
                    "path": {
                        "type": "string",
                        "description": "Path of the API request"
                    },
                    "data": {
                        "type": "object",
                        "description": "Request data",
                        "additionalProperties": true
                    }
                },
                "required": ["method", "path"]
            }),
        );

        McpTool {
            name: NAME.to_string(),
            description: Some(
                "Make a Paystack API request using the details of the operation. Be sure to get \
                 all operation details including method, path, path parameters, query parameters \
                 and request body before making a call."
                    .to_string(),
            ),
            input_schema: McpInputSchema {
                properties: Some(properties),
                required: Some(vec!["request".to_string()]),
                ..Default::default()
            },
        }
    }

    async fn call(
        &self,
        arguments: Value,
        _peer: &ClientPeer,
    ) -> Result<ToolCallResult, McpError> {
        let Arguments { request } = parse_arguments(arguments)?;

        info!("Forwarding {} {}", request.method, request.path);

        match self
            .client
            .make_request(&request.method, &request.path, request.data)
            .await
        {
            Ok(response) => Ok(ToolCallResult::text(pretty(&response)?)),
            Err(e) => {
                warn!("Request to {} failed: {}", request.path, e);
                Ok(ToolCallResult::text(format!("Unable to make request. {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paystack_client::ClientConfig;

    fn tool() -> MakePaystackRequest {
        // Nothing listens on port 9; connection attempts fail fast.
        let client = PaystackClient::new(
            ClientConfig::new("sk_test_unit").with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();
        MakePaystackRequest::new(Arc::new(client))
    }

    #[test]
    fn test_definition_requires_request() {
        let definition = tool().definition();
        assert_eq!(definition.name, "make_paystack_request");
        let properties = definition.input_schema.properties.unwrap();
        assert_eq!(properties["request"]["required"], json!(["method", "path"]));
    }

    #[tokio::test]
    async fn test_invalid_method_is_reported_as_text() {
        let result = tool()
            .call(
                json!({"request": {"method": "NOT A METHOD", "path": "/transaction"}}),
                &ClientPeer::default(),
            )
            .await
            .unwrap();

        let text = result.first_text().unwrap();
        assert!(text.starts_with("Unable to make request. "));
        assert!(text.contains("Invalid HTTP method"));
    }

    #[tokio::test]
    async fn test_missing_request_is_invalid_params() {
        let err = tool()
            .call(json!({"method": "GET"}), &ClientPeer::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, -32602);
    }
}
