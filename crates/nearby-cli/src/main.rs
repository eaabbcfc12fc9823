//! Nearby CLI - main entry point

use clap::Parser;
use tracing::{error, info};

use nearby_cli::{
    cli::{Cli, Commands},
    config::AppConfig,
    demo::run_demo,
    error::Result,
};
use nearby_core::SUPPORTED_EVENTS;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = load_configuration(&cli)?;

    match cli.command {
        Commands::Demo {
            message,
            api_key,
            linger_ms,
        } => {
            if let Some(message) = message {
                config.demo.message = message;
            }
            if let Some(api_key) = api_key {
                config.api_key = api_key;
            }
            if let Some(linger_ms) = linger_ms {
                config.demo.linger_ms = linger_ms;
            }
            config.validate()?;

            match run_demo(&config).await {
                Ok(events) => {
                    for event in &events {
                        println!("{}", serde_json::to_string(event)?);
                    }
                }
                Err(e) => {
                    error!("Demo failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Events => {
            for name in SUPPORTED_EVENTS {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults
fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    if let Some(config_path) = &cli.config {
        info!("Loading configuration from: {}", config_path);
        AppConfig::load_from_file(config_path)
    } else {
        info!("Using default configuration");
        Ok(AppConfig::default())
    }
}
