//! Self-RAG CLI - Command-line interface for the adaptive RAG pipeline.

use anyhow::Context;
use clap::Parser;
use selfrag_cli::{backend, commands, AppConfig, Cli, CliFormat, Command, Formatter};
use selfrag_domain::traits::KnowledgeStore;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Credentials such as GOOGLE_API_KEY may live in a .env file
    dotenvy::dotenv().ok();

    // Log to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(database) = cli.database {
        config.store.path = Some(database);
    }

    let formatter = Formatter::new(cli.format.unwrap_or(CliFormat::Text), !cli.no_color);

    if let Command::Config = cli.command {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut pipeline = backend::build_pipeline(&config).context("Failed to set up pipeline")?;

    match cli.command {
        Command::Ingest(args) => {
            let outcome = commands::execute_ingest(args, &mut pipeline, &formatter)?;
            if !outcome.success {
                std::process::exit(2);
            }
        }
        Command::Query(args) => commands::execute_query(args, &pipeline, &formatter)?,
        Command::Ask(args) => commands::execute_ask(args, &pipeline)?,
        Command::Count => {
            let count = pipeline.store().count()?;
            if formatter.is_json() {
                println!("{}", formatter.json(&serde_json::json!({ "count": count }))?);
            } else {
                println!("{}", count);
            }
        }
        Command::Delete(args) => commands::execute_delete(args, &mut pipeline, &formatter)?,
        Command::Config => unreachable!("handled before the pipeline is built"),
    }

    Ok(())
}
