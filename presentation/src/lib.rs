//! Presentation layer for zen-gateway
//!
//! This crate contains the CLI definition, both protocol front ends, the
//! stdio JSON-RPC server and the one-shot output formatters.

pub mod cli;
pub mod output;
pub mod protocol;
pub mod server;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use output::{ConsoleFormatter, JsonFormatter, OutputFormatter, formatter_for};
pub use protocol::cli::{
    EXIT_INTERNAL, EXIT_OK, OutputMode, exit_code, parse_invocation, read_arguments,
};
pub use server::StdioServer;
