//! CLI transport front end.
//!
//! `zen-gateway <tool> '<json arguments>'` becomes a [`ToolRequest`]; the
//! outcome becomes an exit code, one per error category.

use gateway_domain::{ErrorKind, GatewayError, RequestId, ToolRequest, TransportKind};
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Environment variable selecting the CLI output mode.
pub const OUTPUT_ENV: &str = "ZEN_GATEWAY_OUTPUT";

/// How CLI results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

impl OutputMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Some(OutputMode::Human),
            "json" => Some(OutputMode::Json),
            _ => None,
        }
    }

    /// Mode from `ZEN_GATEWAY_OUTPUT`; unset or unrecognized means human.
    pub fn from_env() -> Self {
        std::env::var(OUTPUT_ENV)
            .ok()
            .and_then(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }
}

/// Build a request from the tool name and the raw argument blob.
///
/// A missing or blank blob means no arguments. Anything that is not a JSON
/// object is an argument error.
pub fn parse_invocation(tool: &str, args_json: Option<&str>) -> Result<ToolRequest, GatewayError> {
    let arguments = match args_json.map(str::trim).filter(|s| !s.is_empty()) {
        None => Map::new(),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(GatewayError::Argument(
                    "arguments must be a JSON object".to_string(),
                ));
            }
            Err(e) => {
                return Err(GatewayError::Argument(format!(
                    "arguments are not valid JSON: {e}"
                )));
            }
        },
    };
    Ok(ToolRequest::new(
        tool,
        arguments,
        TransportKind::Cli,
        RequestId::generate(),
    ))
}

/// Read an argument blob passed as `-`, without blocking the runtime.
pub async fn read_arguments<R>(mut reader: R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut raw = String::new();
    reader.read_to_string(&mut raw).await?;
    Ok(raw)
}

pub const EXIT_OK: i32 = 0;
pub const EXIT_INTERNAL: i32 = 1;

/// Process exit code for a failure category.
pub fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Protocol | ErrorKind::Argument => 2,
        ErrorKind::UnknownTool => 3,
        ErrorKind::ModelNotFound => 4,
        ErrorKind::NoAvailableModel => 5,
        ErrorKind::Provider => 6,
        ErrorKind::InvalidAttachment => 7,
        ErrorKind::ThreadNotFound => 8,
        ErrorKind::ThreadFull => 9,
        ErrorKind::PathOutsideWorkspace | ErrorKind::PathTraversal => 10,
        ErrorKind::Storage | ErrorKind::Cancelled => EXIT_INTERNAL,
    }
}
