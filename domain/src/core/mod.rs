//! Core domain concepts shared across all subdomains.
//!
//! - [`error::GatewayError`]: the error taxonomy every layer reports through

pub mod error;
