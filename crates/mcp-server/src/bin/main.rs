//! Paystack MCP server CLI
//!
//! Parses the Paystack OpenAPI document once at startup, then serves MCP over
//! stdio (default) or HTTP. Logs go to stderr so stdout stays reserved for
//! the protocol.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use paystack_client::{ClientConfig, PaystackClient, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use paystack_mcp_server::{Capabilities, McpServer, ServerMode};
use paystack_openapi::OpenApiParser;

/// Paystack MCP server - Paystack API operations for MCP clients
#[derive(Parser, Debug)]
#[command(name = "paystack-mcp")]
#[command(version)]
#[command(about = "Paystack MCP server - Paystack API operations via MCP")]
struct Args {
    /// Run in stdio mode (default)
    #[arg(long, conflicts_with = "http")]
    stdio: bool,

    /// Run in HTTP mode
    #[arg(long)]
    http: bool,

    /// Port for HTTP server
    #[arg(long, env = "MCP_PORT", default_value = "3000")]
    port: u16,

    /// Paystack secret key
    #[arg(long, env = "PAYSTACK_SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Paystack API base URL
    #[arg(long, env = "PAYSTACK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// User agent sent with every request
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Request timeout in milliseconds
    #[arg(long, env = "PAYSTACK_TIMEOUT_MS", default_value = "30000")]
    timeout_ms: u64,

    /// Path of the Paystack OpenAPI document
    #[arg(long, env = "PAYSTACK_OPENAPI_SPEC", default_value = "data/paystack.openapi.yaml")]
    openapi_spec: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut parser = OpenApiParser::new(args.openapi_spec.clone());
    parser.parse().await;
    if parser.get_operations().is_empty() {
        warn!(
            "No operations loaded from {}; operation lookups will be empty",
            args.openapi_spec.display()
        );
    }

    let config = ClientConfig::new(args.secret_key)
        .with_base_url(args.base_url)
        .with_user_agent(args.user_agent)
        .with_timeout(Duration::from_millis(args.timeout_ms));
    let client = PaystackClient::new(config)?;

    let capabilities = Capabilities::paystack(Arc::new(parser), Arc::new(client));

    let mode = if args.http {
        ServerMode::Http { port: args.port }
    } else {
        ServerMode::Stdio
    };

    info!("Starting Paystack MCP server ({:?})", mode);

    McpServer::new(capabilities).with_mode(mode).run().await?;

    Ok(())
}
