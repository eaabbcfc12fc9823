//! Command line interface definition

use clap::{Parser, Subcommand};

/// Proximity publish/subscribe messaging over a simulated radio medium
#[derive(Parser, Debug)]
#[command(name = "nearby", version, about)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a publisher and a subscriber on one simulated medium and print the event stream
    Demo {
        /// Message the publisher broadcasts
        #[arg(short, long)]
        message: Option<String>,

        /// API key used by both devices
        #[arg(long)]
        api_key: Option<String>,

        /// How long to listen after each step, in milliseconds
        #[arg(long)]
        linger_ms: Option<u64>,
    },
    /// List the event names delivered on the event stream
    Events,
}
