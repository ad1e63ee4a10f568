// src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use intentor::{report, IntentorApp};
use intentor_config::{ConfigLoader, IntentorConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Classify a natural-language request into one of a fixed set of intents
#[derive(Parser, Debug)]
#[command(name = "intentor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "INTENTOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web page and HTTP API (default)
    Serve,

    /// Classify a single query and print the result
    Classify(ClassifyArgs),
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Print the raw result as JSON
    #[arg(long)]
    json: bool,

    /// Query text; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;

    init_logging(&config)?;

    let app = IntentorApp::new(config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            app.run().await?;
            info!("intentor shut down successfully");
        }
        Command::Classify(args) => {
            let query = args.query.join(" ");
            let result = app.classify(&query).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", report::render(&result));
            }
        }
    }

    Ok(())
}

fn init_logging(config: &IntentorConfig) -> Result<()> {
    let default_filter = format!("intentor={},info", config.app.log_level);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&default_filter))?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
