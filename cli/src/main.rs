//! CLI entrypoint for streamchat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use streamchat_application::{
    AnimationParams, GenerationController, NoTranscriptStore, StreamGenerationUseCase,
    StreamTransport, TranscriptStore,
};
use streamchat_domain::{ConversationId, EngineSelection, SessionOutcome, Severity};
use streamchat_infrastructure::http::{AppState, serve};
use streamchat_infrastructure::{
    ConfigLoader, EngineSet, FileConfig, HttpStreamTransport, JsonlTranscriptStore,
    LoopbackTransport, build_engines,
};
use streamchat_presentation::{ChatRepl, Cli, Command, ConsoleTranscript, run_prompt, set_color};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let command = cli.command();
    let log_dir = match &command {
        Command::Serve {
            log_dir: Some(dir), ..
        } => Some(dir.clone()),
        _ => config.logging.log_dir.as_ref().map(PathBuf::from),
    };
    let _log_guard = init_logging(cli.verbose, config.logging.filter.as_deref(), log_dir.as_deref());

    info!("Starting streamchat");
    check_config(&config)?;
    set_color(config.output.color);

    match command {
        Command::Serve { host, port, .. } => run_server(&config, host, port).await,
        Command::Chat { conversation } => run_chat(&cli, &config, conversation).await,
        Command::Ask { prompt } => run_ask(&cli, &config, &prompt).await,
        Command::Models => list_models(&cli, &config).await,
    }
}

/// Initialize logging based on verbosity level.
///
/// Logs go to stderr; with a log directory they are also written to a
/// daily-rotated file. The returned guard must live until exit.
fn init_logging(verbose: u8, configured: Option<&str>, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => configured
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "streamchat.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    guard
}

/// Report configuration issues; errors abort startup.
fn check_config(config: &FileConfig) -> Result<()> {
    for issue in config.validate() {
        match issue.severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => eprintln!("config error: {}", issue.message),
        }
    }
    config.ensure_valid()?;
    Ok(())
}

fn build_engine_set(config: &FileConfig) -> Result<EngineSet> {
    let engines = build_engines(&config.engines)?;
    if let Some(ollama) = engines.ollama.clone() {
        tokio::spawn(async move {
            if let Err(e) = ollama.health_check().await {
                warn!("Ollama is not reachable yet: {}", e);
            }
        });
    }
    Ok(engines)
}

async fn run_server(config: &FileConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    // === Dependency Injection ===
    let engines = build_engine_set(config)?;
    let generation = StreamGenerationUseCase::new(engines.router.clone())
        .with_params(config.server.stream_params());
    let state = AppState::new(engines.router.clone())
        .with_generation(Arc::new(generation))
        .with_keep_alive(config.server.keep_alive());

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Could not bind {}:{}", host, port))?;
    println!("streamchat server listening on http://{}", listener.local_addr()?);

    serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down");
    })
    .await?;
    Ok(())
}

/// Transport for client commands: in-process engines or the HTTP server.
fn build_transport(cli: &Cli, config: &FileConfig) -> Result<Arc<dyn StreamTransport>> {
    if cli.local {
        let engines = build_engine_set(config)?;
        let generation = StreamGenerationUseCase::new(engines.router.clone())
            .with_params(config.server.stream_params());
        return Ok(Arc::new(
            LoopbackTransport::new(engines.router).with_generation(Arc::new(generation)),
        ));
    }

    let server_url = cli
        .server
        .clone()
        .unwrap_or_else(|| config.client.server_url.clone());
    if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
        bail!("--server must be an http(s) URL, got '{}'", server_url);
    }
    Ok(Arc::new(HttpStreamTransport::new(
        server_url,
        config.client.connect_timeout(),
    )?))
}

fn engine_selection(cli: &Cli, config: &FileConfig) -> EngineSelection {
    let mut engine = config.client.engine();
    if let Some(service) = &cli.service {
        engine = engine.with_service(service.clone());
    }
    if let Some(model) = &cli.model {
        engine = engine.with_model(model.clone());
    }
    engine
}

fn build_controller(
    cli: &Cli,
    config: &FileConfig,
    conversation: Option<String>,
    transport: Arc<dyn StreamTransport>,
) -> Result<GenerationController> {
    let conversation_id = ConversationId::try_new(
        conversation.unwrap_or_else(|| config.client.conversation_id.clone()),
    )?;

    let animation = if cli.no_animation {
        AnimationParams::instant()
    } else {
        config.animation.to_params()
    };

    let store: Arc<dyn TranscriptStore> = match config.persistence.resolved_path() {
        Some(path) => match JsonlTranscriptStore::new(&path) {
            Some(store) => {
                info!("Saving replies to {}", store.path().display());
                Arc::new(store)
            }
            None => Arc::new(NoTranscriptStore),
        },
        None => Arc::new(NoTranscriptStore),
    };

    let view = ConsoleTranscript::new().with_progress(config.output.show_progress && !cli.quiet);

    Ok(
        GenerationController::new(conversation_id, transport, Arc::new(view))
            .with_animation(animation)
            .with_history(config.client.keep_history)
            .with_store(store),
    )
}

async fn run_chat(cli: &Cli, config: &FileConfig, conversation: Option<String>) -> Result<()> {
    let transport = build_transport(cli, config)?;
    let controller = build_controller(cli, config, conversation, transport.clone())?;

    let mut repl = ChatRepl::new(controller, transport)
        .with_engine(engine_selection(cli, config))
        .with_history_path(config.client.history_file.as_ref().map(PathBuf::from));
    repl.run().await?;
    Ok(())
}

async fn run_ask(cli: &Cli, config: &FileConfig, prompt: &str) -> Result<()> {
    let transport = build_transport(cli, config)?;
    let controller = build_controller(cli, config, None, transport)?;

    let report = run_prompt(&controller, prompt, engine_selection(cli, config)).await?;
    match report.outcome {
        SessionOutcome::Failed(message) => bail!(message),
        SessionOutcome::Completed | SessionOutcome::Cancelled => Ok(()),
    }
}

async fn list_models(cli: &Cli, config: &FileConfig) -> Result<()> {
    let transport = build_transport(cli, config)?;
    let engine = engine_selection(cli, config);

    let models = transport.list_models(engine.service()).await?;
    if models.is_empty() {
        println!("No models available.");
    }
    for model in models {
        println!("{}", model);
    }
    Ok(())
}
