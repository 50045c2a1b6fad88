//! Sintaxis - LLM-powered syntactic analysis of Spanish sentences
//!
//! A CLI tool that streams a sentence through a hosted text-generation
//! model and renders the returned grammatical analysis and ASCII
//! structure diagram as HTML, JSON or plain text.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, output file, etc.)
//!   2 - The analysis service failed (for stdin: at least one sentence)
//!   3 - The sentence was empty

mod analysis;
mod cli;
mod config;
mod llm;
mod models;
mod orchestrator;
mod prompt;
mod report;
mod surface;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE};
use llm::{ClientSettings, GenerationService};
use orchestrator::{AnalyzeError, Analyzer};
use std::io::IsTerminal;
use std::time::Instant;
use surface::{SurfaceOptions, TerminalSurface};
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Sintaxis v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .sintaxis.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to choose the provider, model, output format and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` directives, when set, refine the level chosen by -v/-q.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Analyze the sentence argument, or every stdin line. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    debug!("Provider: {}", config.model.provider);
    let settings = ClientSettings::from_config(&config.model, args.api_key.clone());
    let service = llm::connect(config.model.provider, settings)
        .context("Failed to initialize the generation client")?;
    let model_used = service.describe();
    info!("Using {}", model_used);

    let analyzer = Analyzer::new(service);
    let mut surface = TerminalSurface::new(SurfaceOptions {
        format: config.general.format,
        target: config.output_path().into(),
        progress: config.general.progress,
        model_used,
    });

    match args.sentence_text() {
        Some(sentence) => analyze_once(&analyzer, &mut surface, &sentence).await,
        None => analyze_stdin(&analyzer, &mut surface, args.quiet).await,
    }
}

async fn analyze_once<S: GenerationService>(
    analyzer: &Analyzer<S>,
    surface: &mut TerminalSurface,
    sentence: &str,
) -> Result<i32> {
    let start_time = Instant::now();

    match analyzer.analyze(surface, sentence).await {
        Ok(output) => {
            info!(
                "Analysis complete in {:.1}s (diagram: {})",
                start_time.elapsed().as_secs_f64(),
                if output.has_diagram() { "yes" } else { "no" }
            );
            Ok(0)
        }
        Err(AnalyzeError::EmptyInput) => Ok(3),
        Err(AnalyzeError::Service(_)) => Ok(2),
        Err(e @ AnalyzeError::Output(_)) => Err(e.into()),
    }
}

async fn analyze_stdin<S: GenerationService>(
    analyzer: &Analyzer<S>,
    surface: &mut TerminalSurface,
    quiet: bool,
) -> Result<i32> {
    let interactive = std::io::stdin().is_terminal();
    if interactive && !quiet {
        eprintln!("✍️  Escribe una oración por línea (Ctrl-D para terminar).");
    }

    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    let stats = orchestrator::run_session(analyzer, surface, reader).await?;

    if !quiet {
        eprintln!("\n📊 Resumen:");
        eprintln!("   Analizadas: {}", stats.completed);
        eprintln!("   Fallidas: {}", stats.failed);
        eprintln!("   Vacías: {}", stats.empty);
    }

    Ok(if stats.failed > 0 { 2 } else { 0 })
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
