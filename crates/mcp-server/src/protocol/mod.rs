//! MCP protocol types and handling

mod capabilities;
mod handler;
mod peer;
mod types;

pub use capabilities::ServerCapabilities;
pub use handler::{RequestHandler, SERVER_NAME};
pub use peer::{ClientPeer, CLIENT_REQUEST_TIMEOUT};
pub use types::*;
