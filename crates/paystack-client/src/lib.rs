//! # paystack-client
//!
//! Minimal Paystack REST client for the MCP server. Every call returns the
//! `{status, message, data, meta}` envelope; upstream bodies that are not
//! JSON surface as [`ClientError::NonJsonResponse`] with the HTTP status and
//! a truncated snippet.

mod client;
mod config;
mod error;
pub mod redact;
mod types;

pub use client::PaystackClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use error::{truncate_snippet, ClientError, ClientResult, SNIPPET_LIMIT};
pub use redact::redact_sensitive;
pub use types::PaystackResponse;
