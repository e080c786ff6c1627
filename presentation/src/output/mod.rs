//! Output formatting for one-shot CLI runs

pub mod console;
pub mod formatter;

pub use console::{ConsoleFormatter, JsonFormatter, formatter_for};
pub use formatter::OutputFormatter;
