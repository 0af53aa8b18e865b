//! `paystack://operations/list`: the whole compiled operation table

use std::sync::Arc;

use async_trait::async_trait;
use paystack_openapi::OpenApiParser;
use serde_json::json;
use url::Url;

use super::Resource;
use crate::protocol::{McpError, McpResource, ResourceContents, ResourceReadResult};
use crate::tools::pretty;

pub const OPERATION_LIST_URI: &str = "paystack://operations/list";

pub struct OperationList {
    parser: Arc<OpenApiParser>,
}

impl OperationList {
    pub fn new(parser: Arc<OpenApiParser>) -> Self {
        Self { parser }
    }
}

#[async_trait]
impl Resource for OperationList {
    fn definition(&self) -> McpResource {
        McpResource {
            uri: OPERATION_LIST_URI.to_string(),
            name: "paystack_operation_list".to_string(),
            description: Some("Retrieve all Paystack API details".to_string()),
            mime_type: Some("application/json".to_string()),
        }
    }

    fn matches(&self, uri: &Url) -> bool {
        uri.scheme() == "paystack" && uri.host_str() == Some("operations") && uri.path() == "/list"
    }

    async fn read(&self, uri: &Url) -> Result<ResourceReadResult, McpError> {
        let operations = self.parser.get_operations();

        let text = if operations.is_empty() {
            json!({"message": "Unable to retrive all operations"}).to_string()
        } else {
            pretty(operations)?
        };

        Ok(ResourceReadResult {
            contents: vec![ResourceContents::json(uri.as_str(), text)],
        })
    }
}
