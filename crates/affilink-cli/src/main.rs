mod lookup;

use std::process::ExitCode;

use affilink_core::Environment;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "affilink")]
#[command(about = "Resolve affiliate links and look up marketplace product data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Detect the marketplace and canonical product URL of a link (offline)
    Detect {
        /// Affiliate or product URL as pasted by the merchant
        url: String,
    },
    /// Detect the marketplace of a link and fetch its product data
    Resolve {
        /// Affiliate or product URL as pasted by the merchant
        url: String,
    },
    /// Fetch product data for a URL from a named marketplace
    Scrape {
        /// Product URL
        url: String,
        /// Marketplace to query (defaults to the detected one)
        #[arg(long)]
        marketplace: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect { url } => {
            init_tracing(lookup::DEFAULT_LOG_LEVEL, LogFormat::Text)?;
            lookup::run_detect(&url)
        }
        Commands::Resolve { url } => {
            let config = affilink_core::load_app_config()?;
            init_tracing(&config.log_level, LogFormat::for_env(&config.env))?;
            lookup::run_resolve(&config, &url).await
        }
        Commands::Scrape { url, marketplace } => {
            let config = affilink_core::load_app_config()?;
            init_tracing(&config.log_level, LogFormat::for_env(&config.env))?;
            lookup::run_scrape(&config, &url, marketplace.as_deref()).await
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event, for log collectors.
    Json,
}

impl LogFormat {
    fn for_env(env: &Environment) -> Self {
        match env {
            Environment::Production => LogFormat::Json,
            Environment::Development | Environment::Test => LogFormat::Text,
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable JSON.
fn init_tracing(fallback_level: &str, format: LogFormat) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback_level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().with_ansi(false).init(),
    }
    Ok(())
}
