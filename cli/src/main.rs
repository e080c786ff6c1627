//! CLI entrypoint for zen-gateway
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use gateway_application::{
    ConversationManager, DispatchError, ExecutionDispatcher, ModelRouter, RequestLogger,
};
use gateway_domain::ConfigIssue;
use gateway_infrastructure::{
    ConfigLoader, FileConfig, GenerationHandler, JsonlRequestLogger, build_provider_clients,
    default_registry, open_thread_store,
};
use gateway_presentation::{
    Cli, EXIT_OK, OutputMode, StdioServer, exit_code, formatter_for, parse_invocation,
    read_arguments,
};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.show_config {
        show_config(&cli);
        return ExitCode::SUCCESS;
    }

    let config = if cli.no_config {
        Ok(ConfigLoader::load_defaults())
    } else {
        ConfigLoader::load(cli.config.as_deref())
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Must outlive every log call
    let _guard = init_logging(cli.verbose, &config);

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr (stdout carries protocol frames), plus a daily file
/// under `[logging] dir` when configured.
fn init_logging(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.logging.level.as_deref().unwrap_or("warn"))
        }),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match &config.logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "zen-gateway.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

fn show_config(cli: &Cli) {
    println!("Configuration sources (highest priority first):");
    for source in ConfigLoader::sources(cli.config.as_deref()) {
        let status = if source.found { "found" } else { "not found" };
        println!("  {:<9} {} ({})", source.label, source.location, status);
    }

    if cli.no_config {
        return;
    }
    match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => {
            let env = |name: &str| std::env::var(name).ok();
            let (providers, mut issues) = config.providers.resolve(&env);
            issues.extend(config.validate());

            println!();
            println!("Providers:");
            for settings in &providers {
                println!("  {:<11} {}", settings.id, settings.base_url);
            }
            println!();
            println!("Thread store: {}", config.conversation.store_dir().display());
            if !issues.is_empty() {
                println!();
                println!("Issues:");
                for issue in &issues {
                    println!("  [{:?}] {}", issue.severity, issue.message);
                }
            }
        }
        Err(e) => println!("\nerror: {e}"),
    }
}

fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!(code = ?issue.code, "{}", issue.message);
    }
    let errors: Vec<&str> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.message.as_str())
        .collect();
    if !errors.is_empty() {
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(())
}

async fn run(cli: Cli, config: FileConfig) -> Result<ExitCode> {
    info!("Starting zen-gateway");

    let env = |name: &str| std::env::var(name).ok();
    let (provider_settings, mut issues) = config.providers.resolve(&env);
    issues.extend(config.validate());
    report_issues(&issues)?;

    // === Dependency Injection ===
    let clients = build_provider_clients(&provider_settings)?;
    info!(
        providers = ?provider_settings.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        "Provider clients ready"
    );
    let router = ModelRouter::new(config.catalog(), clients, config.router_config());

    let store = open_thread_store(&config.conversation)?;
    let conversations = Arc::new(ConversationManager::new(store, config.conversation_config()));

    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    let translator = config.path_translator(&cwd);

    let mut dispatcher = ExecutionDispatcher::new(
        Arc::new(default_registry()),
        Arc::new(router),
        conversations.clone(),
        Arc::new(translator),
        Arc::new(GenerationHandler::new()),
    )
    .with_retry_policy(config.retry_policy());
    if let Some(path) = &config.logging.request_log
        && let Some(logger) = JsonlRequestLogger::new(path)
    {
        info!(path = %logger.path().display(), "Request log enabled");
        let logger: Arc<dyn RequestLogger> = Arc::new(logger);
        dispatcher = dispatcher.with_request_logger(logger);
    }
    let dispatcher = Arc::new(dispatcher);

    let shutdown = CancellationToken::new();
    let sweeper = conversations.spawn_sweeper(shutdown.clone());
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted");
                shutdown.cancel();
            }
        });
    }

    let code = match cli.tool {
        None => {
            StdioServer::new(dispatcher).run(shutdown.clone()).await?;
            ExitCode::SUCCESS
        }
        Some(tool) => run_once(&dispatcher, &tool, cli.args.as_deref(), &shutdown).await?,
    };

    shutdown.cancel();
    let _ = sweeper.await;
    Ok(code)
}

async fn run_once(
    dispatcher: &ExecutionDispatcher,
    tool: &str,
    args: Option<&str>,
    shutdown: &CancellationToken,
) -> Result<ExitCode> {
    let formatter = formatter_for(OutputMode::from_env());

    let stdin_args;
    let args = match args {
        Some("-") => {
            stdin_args = read_arguments(tokio::io::stdin())
                .await
                .context("failed to read arguments from stdin")?;
            Some(stdin_args.as_str())
        }
        other => other,
    };

    let request = match parse_invocation(tool, args) {
        Ok(request) => request,
        Err(e) => {
            let error = DispatchError::from(e);
            eprintln!("{}", formatter.format_error(&error).trim_end());
            return Ok(ExitCode::from(exit_code(error.error.kind()) as u8));
        }
    };

    match dispatcher.dispatch(&request, shutdown).await {
        Ok(response) => {
            println!("{}", formatter.format_response(&response).trim_end());
            Ok(ExitCode::from(EXIT_OK as u8))
        }
        Err(error) => {
            eprintln!("{}", formatter.format_error(&error).trim_end());
            Ok(ExitCode::from(exit_code(error.error.kind()) as u8))
        }
    }
}
