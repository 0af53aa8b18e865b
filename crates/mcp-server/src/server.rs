//! Main MCP server orchestration

use std::sync::Arc;
use tracing::info;

use crate::capabilities::Capabilities;
use crate::error::ServerResult;
use crate::transport::{HttpTransport, StdioTransport};

/// Server mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerMode {
    /// stdio transport
    #[default]
    Stdio,
    /// HTTP/SSE transport
    Http { port: u16 },
}

/// MCP server
pub struct McpServer {
    capabilities: Arc<Capabilities>,
    mode: ServerMode,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities: Arc::new(capabilities),
            mode: ServerMode::default(),
        }
    }

    /// Set the server mode
    pub fn with_mode(mut self, mode: ServerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ServerMode {
        self.mode
    }

    /// Run the server
    pub async fn run(&self) -> ServerResult<()> {
        match self.mode {
            ServerMode::Stdio => {
                info!("Paystack MCP Server running on stdio");
                let transport = StdioTransport::new(self.capabilities.clone());
                transport.run().await
            }
            ServerMode::Http { port } => {
                info!("Paystack MCP Server running on http://localhost:{}", port);
                let transport = HttpTransport::new(self.capabilities.clone(), port);
                transport.run().await
            }
        }
    }
}
