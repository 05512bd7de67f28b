//! MCP tool server adapter
//!
//! Implements ToolProtocolClient for MCP servers reached over stdio or HTTP.

pub mod channel;
pub mod client;
pub mod error;
pub mod http;
pub mod protocol;
pub mod stream;
pub mod transport;

pub use channel::RpcChannel;
pub use client::McpClient;
pub use error::{McpError, Result};
pub use http::HttpChannel;
pub use stream::{ServerCommand, StreamChannel};
