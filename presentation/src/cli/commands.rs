//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for zen-gateway
#[derive(Parser, Debug)]
#[command(name = "zen-gateway")]
#[command(author, version, about = "Route tool requests to remote language models")]
#[command(long_about = r#"
zen-gateway lets a calling agent invoke a fixed catalog of tools (chat,
thinkdeep, codereview, analyze, debug, docgen, consensus, seer, refactor).
Each request is routed to a model that supports what the tool needs, and
multi-turn context is kept between calls through a continuation_id.

Without a TOOL, the gateway serves newline-delimited JSON-RPC on stdio.
With a TOOL, it runs that one request and exits; set ZEN_GATEWAY_OUTPUT=json
for machine-readable output.

Configuration files are loaded from (in priority order):
1. ZEN_GATEWAY_* environment variables
2. --config <path>           Explicit config file
3. ./zen-gateway.toml        Project-level config
4. ~/.config/zen-gateway/config.toml   Global config

Example:
  zen-gateway
  zen-gateway chat '{"prompt": "Is this lock-free queue correct?", "files": ["/src/queue.rs"]}'
  zen-gateway chat '{"prompt": "And with two producers?", "continuation_id": "..."}'
"#)]
pub struct Cli {
    /// Tool to run once (serve on stdio when omitted)
    pub tool: Option<String>,

    /// Tool arguments as a JSON object ("-" reads them from stdin)
    #[arg(value_name = "ARGS_JSON")]
    pub args: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
