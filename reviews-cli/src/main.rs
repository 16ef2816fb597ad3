//! Smart Reviews CLI - Command line interface and server
//!
//! Collects product reviews and keeps an AI summary and keyword set in step
//! with them.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reviews_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ProductArgs, ReviewArgs, SecretsArgs, ServeArgs, ShopArgs};

/// Smart Reviews: product reviews with AI summaries and keywords
#[derive(Parser, Debug)]
#[command(name = "smart-reviews")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the SQLite database (overrides config and env)
    #[arg(long, global = true, env = "SMART_REVIEWS_DATABASE")]
    database: Option<PathBuf>,

    /// Completion model (overrides config and env)
    #[arg(long, global = true, env = "SMART_REVIEWS_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the HTTP API
    Serve(ServeArgs),

    /// Submit reviews
    #[command(visible_alias = "r")]
    Review(ReviewArgs),

    /// Inspect a product
    #[command(visible_alias = "p")]
    Product(ProductArgs),

    /// Inspect a shop
    Shop(ShopArgs),

    /// Manage the API key file
    Secrets(SecretsArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.database.clone(), cli.model.clone())?;

    if cli.verbose {
        tracing::info!(
            database = %config.database.path.display(),
            model = %config.completion.model,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("smart-reviews {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Review(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Product(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Shop(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Secrets(args)) => {
            args.execute()?;
        }
        Some(Commands::Config) => {
            print_config(&config);
        }
        None => {
            println!("Smart Reviews - Product reviews with AI summaries and keywords");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("Smart Reviews Configuration");
    println!("===========================");
    println!();
    println!("Server:");
    println!("  bind: {}", config.server.bind);
    println!();
    println!("Database:");
    println!("  path: {}", config.database.path.display());
    println!("  max_connections: {}", config.database.max_connections);
    println!();
    println!("Completion:");
    println!("  base_url: {}", config.completion.base_url);
    println!("  model: {}", config.completion.model);
    println!("  max_tokens: {}", config.completion.max_tokens);
    match config.completion.timeout {
        Some(timeout) => println!("  timeout: {:?}", timeout),
        None => println!("  timeout: (none)"),
    }
    println!();
    println!("Synthesis:");
    println!("  summary_period: {}", config.synthesis.summary_period);
    println!("  keyword_period: {}", config.synthesis.keyword_period);
    println!(
        "  rating range: {}..={}",
        config.synthesis.min_rating, config.synthesis.max_rating
    );
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
