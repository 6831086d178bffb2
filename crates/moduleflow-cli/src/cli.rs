//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (TOML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Boot an app, drive the sample modules, and print the resulting state
    Demo {
        /// How long the clock component stays mounted, in seconds
        #[arg(short, long, default_value_t = 3)]
        seconds: u64,
        /// Items added to the cart
        #[arg(short, long, default_values_t = vec!["sku-1".to_string(), "sku-2".to_string()])]
        items: Vec<String>,
        /// Make the checkout fail
        #[arg(long)]
        fail_checkout: bool,
    },
    /// List the qualified actions of the sample modules
    Actions,
    /// Print the effective configuration as TOML
    Config,
}
