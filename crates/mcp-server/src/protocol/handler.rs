//! MCP request handler

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use super::capabilities::ServerCapabilities;
use super::peer::ClientPeer;
use super::types::*;
use crate::capabilities::Capabilities;

/// Server name reported during initialization
pub const SERVER_NAME: &str = "paystack";

/// Handler for MCP requests.
///
/// Takes `&self` so a transport can run several requests of one session
/// concurrently.
pub struct RequestHandler {
    capabilities: Arc<Capabilities>,
    server_version: String,
    /// Whether the session is initialized
    initialized: AtomicBool,
    peer: ClientPeer,
}

impl RequestHandler {
    /// Create a new request handler
    pub fn new(capabilities: Arc<Capabilities>) -> Self {
        Self {
            capabilities,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            initialized: AtomicBool::new(false),
            peer: ClientPeer::default(),
        }
    }

    /// Attach the client side of the session, enabling server-initiated requests
    pub fn with_peer(mut self, peer: ClientPeer) -> Self {
        self.peer = peer;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Handle an incoming message
    pub async fn handle(&self, message: McpMessage) -> Option<McpMessage> {
        if message.jsonrpc != JSONRPC_VERSION {
            warn!("Rejecting message with jsonrpc version {:?}", message.jsonrpc);
            return message
                .id
                .map(|id| McpMessage::error_response(Some(id), McpError::invalid_request()));
        }

        if message.method.is_none() {
            // Answer to a request this server sent
            match message.id.clone() {
                Some(id) => {
                    if !self.peer.resolve(message) {
                        debug!("Dropping response {} with no pending request", id);
                    }
                }
                None => debug!("Received message without method or id"),
            }
            return None;
        }

        match (message.method.as_deref(), message.id.clone()) {
            (Some(method), Some(id)) => {
                debug!("Handling request: {}", method);

                let result = match method {
                    "initialize" => self.handle_initialize(message.params),
                    "ping" => Ok(serde_json::json!({})),
                    "tools/list" => self.handle_tools_list(),
                    "tools/call" => self.handle_tools_call(message.params).await,
                    "resources/list" => self.handle_resources_list(),
                    "resources/read" => self.handle_resources_read(message.params).await,
                    _ => Err(McpError::method_not_found()),
                };

                Some(match result {
                    Ok(result) => McpMessage::response(id, result),
                    Err(error) => McpMessage::error_response(Some(id), error),
                })
            }
            (Some(method), None) => {
                match method {
                    "notifications/initialized" | "initialized" => info!("Client initialized"),
                    "notifications/cancelled" => debug!("Request cancelled"),
                    _ => debug!("Unknown notification: {}", method),
                }
                None
            }
            (None, _) => None,
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = decode_params(params)?;

        info!(
            "Initializing session with client: {} v{}",
            params.client_info.name, params.client_info.version
        );

        self.peer.set_sampling(params.capabilities.sampling.is_some());
        self.initialized.store(true, Ordering::Release);

        to_value(InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities::with_tools_and_resources(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: self.server_version.clone(),
            },
        })
    }

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        to_value(ToolsListResult {
            tools: self.capabilities.tool_definitions(),
        })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ToolCallParams = decode_params(params)?;

        debug!("Calling tool: {}", params.name);

        let tool = self
            .capabilities
            .tool(&params.name)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        match tool
            .call(params.arguments.unwrap_or(Value::Null), &self.peer)
            .await
        {
            Ok(result) => to_value(result),
            Err(e) => {
                error!("Tool {} failed: {}", params.name, e.message);
                Err(e)
            }
        }
    }

    fn handle_resources_list(&self) -> Result<Value, McpError> {
        to_value(ResourcesListResult {
            resources: self.capabilities.resource_definitions(),
        })
    }

    async fn handle_resources_read(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ResourceReadParams = decode_params(params)?;

        debug!("Reading resource: {}", params.uri);

        let uri = Url::parse(&params.uri)
            .map_err(|e| McpError::invalid_params(format!("Invalid URI {}: {}", params.uri, e)))?;

        let resource = self
            .capabilities
            .resource(&uri)
            .ok_or_else(|| McpError::resource_not_found(&params.uri))?;

        to_value(resource.read(&uri).await?)
    }
}

fn decode_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::invalid_params(e.to_string()))?
        .ok_or_else(|| McpError::invalid_params("Missing params"))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::internal_error(e.to_string()))
}
