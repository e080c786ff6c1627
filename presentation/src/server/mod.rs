mod stdio;

pub use stdio::{DEFAULT_PROTOCOL_VERSION, StdioServer};
