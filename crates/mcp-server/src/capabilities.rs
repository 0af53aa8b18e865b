//! The set of tools and resources a server instance exposes

use std::sync::Arc;

use paystack_client::PaystackClient;
use paystack_openapi::OpenApiParser;
use url::Url;

use crate::protocol::{McpResource, McpTool};
use crate::resources::{OperationList, Resource, TransactionsList};
use crate::tools::{
    GetPaystackOperation, GetPaystackOperationGuided, ListTransactions, MakePaystackRequest, Tool,
};

/// Tools and resources, built once at startup and shared by every transport
#[derive(Default, Clone)]
pub struct Capabilities {
    tools: Vec<Arc<dyn Tool>>,
    resources: Vec<Arc<dyn Resource>>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard Paystack set
    pub fn paystack(parser: Arc<OpenApiParser>, client: Arc<PaystackClient>) -> Self {
        Self::new()
            .with_tool(GetPaystackOperation::new(parser.clone()))
            .with_tool(GetPaystackOperationGuided::new(parser.clone()))
            .with_tool(MakePaystackRequest::new(client.clone()))
            .with_tool(ListTransactions::new(client.clone()))
            .with_resource(OperationList::new(parser))
            .with_resource(TransactionsList::new(client))
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn with_resource(mut self, resource: impl Resource + 'static) -> Self {
        self.resources.push(Arc::new(resource));
        self
    }

    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// First resource serving `uri`
    pub fn resource(&self, uri: &Url) -> Option<&Arc<dyn Resource>> {
        self.resources.iter().find(|resource| resource.matches(uri))
    }

    pub fn tool_definitions(&self) -> Vec<McpTool> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    pub fn resource_definitions(&self) -> Vec<McpResource> {
        self.resources
            .iter()
            .map(|resource| resource.definition())
            .collect()
    }
}
