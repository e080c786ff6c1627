//! Protocol front end
//!
//! Normalizes both entry transports into a [`ToolRequest`](gateway_domain::ToolRequest):
//!
//! - [`stream`]: newline-delimited JSON-RPC frames ([`jsonrpc`] types)
//! - [`cli`]: a tool name plus a JSON argument blob

pub mod cli;
pub mod jsonrpc;
pub mod stream;
