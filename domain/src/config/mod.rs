//! Configuration validation shared by the loader and the binary.

pub mod validation;

pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
