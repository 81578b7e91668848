//! Self-RAG CLI library.
//!
//! Configuration loading, backend wiring, command execution and output
//! formatting for the `selfrag` binary.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, CliFormat, Command};
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use output::Formatter;
