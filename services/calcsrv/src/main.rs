//! calcsrv main binary
//!
//! Loads configuration, initializes logging, and serves the evaluation
//! API. The `check` subcommand validates configuration without serving.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use formula_calc::FormulaEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

use calcsrv::api::ApiServer;
use calcsrv::config::Config;
use calcsrv::{Result, SERVICE_NAME, SERVICE_VERSION};

#[derive(Parser, Debug)]
#[command(author, version, about = "calcsrv - formula evaluation service")]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print a summary
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;

    init_logging(&config.log.level);

    match args.command {
        Some(Commands::Check) => check_config(&config),
        None => run_service(config).await,
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_service(config: Config) -> Result<()> {
    info!("Starting {} v{}", SERVICE_NAME, SERVICE_VERSION);

    // The whitelist is built here, once; it is immutable afterwards
    let engine = Arc::new(FormulaEngine::new());
    let server = ApiServer::new(engine, config);

    server.start().await
}

fn check_config(config: &Config) -> Result<()> {
    println!("=== {} configuration check ===\n", SERVICE_NAME);

    match config.validate() {
        Ok(()) => println!("✓ configuration valid"),
        Err(e) => {
            println!("✗ configuration invalid: {}", e);
            return Err(e);
        }
    }

    println!("\nService: {} v{}", SERVICE_NAME, SERVICE_VERSION);
    println!("API address: http://{}", config.bind_addr());
    println!("Log level: {}", config.log.level);

    println!("\n✓ all checks passed");
    Ok(())
}
