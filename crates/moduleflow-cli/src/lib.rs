//! moduleflow CLI library
//!
//! A small host application for the moduleflow engine: sample modules,
//! console collaborators, configuration loading and the demo commands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod modules;
pub mod transport;

pub use cli::{Cli, Commands};
pub use commands::{run_demo, CommandDispatcher, DemoOptions, DemoReport};
pub use config::AppConfig;
pub use error::{CliError, Result};
