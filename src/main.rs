//! autocompleter - inline suggestions for desktop text fields

use autocompleter::{
    config::{Config, ConfigManager},
    core::{AutocompleteCoordinator, Collaborators},
    llm::{BackendFactory, SuggestionRequest},
    overlay::ConsoleOverlay,
    platform::{ClipboardPasteInjector, FallbackInjector, ReplayDriver, ReplayScript},
    utils::config::{ConfigBuilder, EnvOverrides, API_KEY_ENV, ENDPOINT_ENV},
    utils::errors::AutocompleteError,
    Result,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Inline autocomplete for desktop text fields
#[derive(Parser)]
#[command(name = "autocompleter")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Use the local stub backend instead of the completion endpoint
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Drive the coordinator from a JSON-lines event script
    Run {
        /// Script path, or `-` for stdin
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Ask the backend for a single suggestion and exit
    Suggest {
        /// Current field text
        text: String,
        /// Extra context such as a field label
        #[arg(long)]
        context: Option<String>,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Show configuration and backend status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        init_logging(cli.log_level.as_deref().unwrap_or("info"))?;
        return init_config(cli.config, force);
    }

    let (manager, config) = load_config(&cli)?;
    init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level))?;
    info!("Starting {} v{}", autocompleter::APP_NAME, autocompleter::VERSION);

    match cli.command {
        Commands::Run { events } => run_script(&config, events).await,
        Commands::Suggest { text, context } => suggest_once(&config, text, context).await,
        Commands::Status => show_status(&manager, &config).await,
        Commands::Init { .. } => Ok(()),
    }
}

/// Initialize logging. Log lines go to stderr so stdout stays readable.
fn init_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level)
        .map_err(|e| AutocompleteError::unknown(format!("Invalid log level: {}", e)))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AutocompleteError::unknown(format!("Failed to set logger: {}", e)))?;

    Ok(())
}

/// Load the file, then environment overrides, then command-line flags
fn load_config(cli: &Cli) -> Result<(ConfigManager, Config)> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::open(path.clone())?,
        None => ConfigManager::new()?,
    };

    let mut config = manager.config().clone();
    EnvOverrides::apply(&mut config);
    if cli.offline {
        config = ConfigBuilder::from_config(config).offline().build();
    }
    config.validate()?;

    Ok((manager, config))
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => ConfigManager::default_config_path()?,
    };

    if path.exists() && !force {
        println!("✅ Configuration already exists at {}", path.display());
        println!("   Use --force to overwrite it with defaults");
        return Ok(());
    }

    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| AutocompleteError::file_system(&path, e))?;
    }
    let manager = ConfigManager::open(path)?;
    println!("✅ Wrote default configuration to {}", manager.path().display());
    Ok(())
}

async fn run_script(config: &Config, events: PathBuf) -> Result<()> {
    let script = if events.as_os_str() == "-" {
        let source = std::io::read_to_string(std::io::stdin())?;
        ReplayScript::parse(&source)?
    } else {
        ReplayScript::from_path(&events)?
    };
    info!("Loaded {} replay steps", script.len());

    let backend = BackendFactory::create_backend(&config.backend)?;
    let overlay = Arc::new(ConsoleOverlay::new());
    let injector = Arc::new(ClipboardPasteInjector::new(&config.injector));
    let collaborators = Collaborators {
        backend,
        overlay: overlay.clone(),
        injector,
    };

    let shutdown = CancellationToken::new();
    let (handle, task) = AutocompleteCoordinator::spawn(config.coordinator.clone(), collaborators, shutdown.clone());
    let mut driver = ReplayDriver::new(handle.clone(), overlay);

    let outcome = tokio::select! {
        outcome = driver.run(&script) => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; stopping replay");
            Ok(())
        }
    };

    let snapshot = handle.snapshot().await?;
    shutdown.cancel();
    let _ = task.await;
    outcome?;

    println!("\n{}", "Final field contents:".bold());
    for (field, text) in driver.field_texts() {
        println!("{}: {}", field, text);
    }
    println!(
        "{} requests, {} suggestions shown, {} stale discarded, {} direct writes, {} paste fallbacks",
        snapshot.stats.requests_issued,
        snapshot.stats.suggestions_shown,
        snapshot.stats.stale_discarded,
        snapshot.stats.direct_writes,
        snapshot.stats.fallback_injections
    );
    Ok(())
}

async fn suggest_once(config: &Config, text: String, context: Option<String>) -> Result<()> {
    let backend = BackendFactory::create_backend(&config.backend)?;
    let mut request = SuggestionRequest::new(text);
    if let Some(context) = context {
        request = request.with_context(context);
    }

    let suggestion = backend.request_suggestion(&request).await?;
    if suggestion.trim().is_empty() {
        println!("{}", "(no suggestion)".dimmed());
    } else {
        println!("{}", suggestion);
    }
    Ok(())
}

async fn show_status(manager: &ConfigManager, config: &Config) -> Result<()> {
    println!("{}", "📊 Autocompleter Status".bold());
    println!("   Version: {}", autocompleter::VERSION);
    println!("   Configuration: {}", manager.path().display());

    println!("\n⌨️  Coordinator:");
    println!("   Debounce delay: {:?}", config.coordinator.debounce_delay());
    println!("   Merge policy: {:?}", config.coordinator.merge_policy);
    println!(
        "   Protected fields: {}",
        if config.coordinator.exclude_protected { "excluded" } else { "tracked" }
    );

    println!("\n🤖 Backend:");
    match config.backend.endpoint() {
        Some(endpoint) => {
            println!("   Endpoint: {}", endpoint);
            println!("   Timeout: {:?}", config.backend.timeout());
            let key_status = if std::env::var(API_KEY_ENV).is_ok() {
                "🌍 Environment"
            } else if config.backend.api_key.is_some() {
                "📁 File"
            } else {
                "none"
            };
            println!("   API key: {}", key_status);
        }
        None => println!("   Local stub (offline)"),
    }
    if std::env::var(ENDPOINT_ENV).is_ok() {
        println!("   Endpoint overridden by {}", ENDPOINT_ENV);
    }

    let injector = ClipboardPasteInjector::new(&config.injector);
    println!("\n📋 Paste fallback:");
    println!("   Command: {}", injector.paste_command().join(" "));
    if injector.is_available().await {
        println!("   Status: available ✓");
    } else {
        println!("   Status: unavailable (accepts into read-only fields are dropped)");
    }

    Ok(())
}
