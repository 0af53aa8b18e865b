//! # paystack-mcp-server
//!
//! MCP (Model Context Protocol) server for the Paystack API.
//! Exposes compiled OpenAPI operations and a request tool over stdio and
//! HTTP/SSE transports.

mod capabilities;
mod error;
pub mod protocol;
pub mod resources;
mod server;
pub mod tools;
pub mod transport;

pub use capabilities::Capabilities;
pub use error::{ServerError, ServerResult};
pub use protocol::{ClientPeer, McpError, McpMessage, RequestHandler, ServerCapabilities};
pub use resources::Resource;
pub use server::{McpServer, ServerMode};
pub use tools::Tool;
pub use transport::{HttpTransport, StdioTransport};
