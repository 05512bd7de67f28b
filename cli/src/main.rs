//! CLI entrypoint for cloudgenie
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use cloudgenie_application::{
    ConversationLogger, ModelAdapter, OrchestrationProgress, OrchestrationService, NoProgress,
    ResultCache, ToolProtocolClient,
};
use cloudgenie_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, McpClient, McpTransport, ModelBackend,
};
use cloudgenie_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C, as shells report SIGINT.
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_filter()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    if let Some(provider) = &cli.provider {
        config.provider.default = provider.clone();
    }

    if cli.show_config {
        return show_config(&cli, &config);
    }

    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            eprintln!("{}", issue);
        } else {
            warn!("{}", issue.message);
        }
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("invalid configuration (run with --show-config to inspect it)");
    }

    info!("Starting cloudgenie");

    // === Dependency Injection ===
    let client = build_tool_client(&config).await?;
    let adapter = build_adapter(&config)?;
    let cache = Arc::new(ResultCache::new(config.orchestration.cache_ttl()));

    let cancel = CancellationToken::new();
    let sweeper = cache.spawn_sweeper(config.orchestration.sweep_interval(), cancel.child_token());
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let connecting =
        OrchestrationService::connect(adapter, client, cache, config.orchestration_params());
    let mut service = tokio::select! {
        connected = connecting => connected.context("could not connect to the MCP server")?,
        _ = cancel.cancelled() => {
            eprintln!("Cancelled");
            std::process::exit(EXIT_CANCELLED);
        }
    };

    if let Some(path) = &config.orchestration.transcript_path {
        match JsonlConversationLogger::open(path) {
            Ok(logger) => {
                info!("Writing transcript to {}", path.display());
                let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
                service = service.with_conversation_logger(logger);
            }
            Err(e) => warn!("Could not open transcript {}: {}", path.display(), e),
        }
    }

    let result = run(&cli, &service, &cancel).await;

    cancel.cancel();
    let _ = sweeper.await;

    match result {
        Ok(()) => Ok(()),
        Err(e)
            if e.downcast_ref::<cloudgenie_application::ProcessPromptError>()
                .is_some_and(|e| e.is_cancelled()) =>
        {
            eprintln!("Cancelled");
            std::process::exit(EXIT_CANCELLED);
        }
        Err(e) => Err(e),
    }
}

async fn run(cli: &Cli, service: &OrchestrationService, cancel: &CancellationToken) -> Result<()> {
    let json = cli.output == OutputFormat::Json;

    if cli.list_tools {
        let tools = service.available_tools();
        if json {
            println!("{}", serde_json::to_string_pretty(&tools)?);
        } else {
            print!("{}", ConsoleFormatter::format_tools(&tools));
        }
        return Ok(());
    }

    if cli.health {
        let report = service.health_check();
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", ConsoleFormatter::format_health(&report));
        }
        return Ok(());
    }

    // Prompt mode - prompt is required
    let Some(prompt) = cli.prompt.as_deref().filter(|p| !p.trim().is_empty()) else {
        bail!("A prompt is required. Use --list-tools, --health or --show-config otherwise.");
    };

    // Execute with or without progress reporting
    let progress: Box<dyn OrchestrationProgress> = if cli.quiet || json {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };
    let outcome = service
        .process_prompt_with_progress(prompt, progress.as_ref(), cancel)
        .await?;
    drop(progress);

    // Output results
    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&outcome),
        OutputFormat::Answer => ConsoleFormatter::format_answer_only(&outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
    };
    println!("{}", output);

    Ok(())
}

async fn build_tool_client(config: &FileConfig) -> Result<Arc<dyn ToolProtocolClient>> {
    let (transport, _) = config.mcp.parse_transport();
    let client: Arc<dyn ToolProtocolClient> = match transport {
        McpTransport::Stdio => {
            let server = config
                .mcp
                .server_command()
                .context("mcp.command is required for the stdio transport")?;
            info!("Spawning MCP server: {} {}", server.command, server.args.join(" "));
            Arc::new(
                McpClient::spawn(&server)
                    .await
                    .with_context(|| format!("failed to start MCP server '{}'", server.command))?
                    .with_setup_timeout(config.mcp.call_timeout()),
            )
        }
        McpTransport::Http => {
            let url = config
                .mcp
                .url
                .as_deref()
                .context("mcp.url is required for the http transport")?;
            info!("Using MCP server at {}", url);
            Arc::new(McpClient::connect_http(url)?.with_setup_timeout(config.mcp.call_timeout()))
        }
    };
    Ok(client)
}

fn build_adapter(config: &FileConfig) -> Result<Arc<dyn ModelAdapter>> {
    let (kind, _) = config.provider.parse_default();
    let settings = config.provider.settings_for(kind).with_context(|| {
        format!(
            "no API key for provider '{}' (set {})",
            kind,
            config.provider.api_key_env(kind)
        )
    })?;
    let backend = ModelBackend::new(kind, settings)?;
    info!("Model backend: {} ({})", backend.kind(), backend.model());
    Ok(Arc::new(backend))
}

fn show_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    println!("Configuration sources (in priority order):");
    for line in ConfigLoader::config_sources(cli.config.as_deref()) {
        println!("  {}", line);
    }
    println!();

    let issues = config.validate();
    if issues.is_empty() {
        println!("No configuration issues.");
    } else {
        for issue in &issues {
            println!("{}", issue);
        }
    }
    println!();

    println!("Effective configuration:");
    println!("{}", config.to_redacted_toml()?);
    Ok(())
}
