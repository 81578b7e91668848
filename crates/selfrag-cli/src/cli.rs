//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Self-RAG CLI - Ask questions against a self-reflective knowledge base.
#[derive(Debug, Parser)]
#[command(name = "selfrag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SELFRAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Knowledge base path (overrides the config file)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable text (default)
    Text,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add documents to the knowledge base
    Ingest(IngestArgs),

    /// Answer a question and show the reflection trace
    Query(QueryArgs),

    /// Answer a question, printing only the answer
    Ask(AskArgs),

    /// Show how many documents are stored
    Count,

    /// Delete documents by identifier
    Delete(DeleteArgs),

    /// Print the effective configuration
    Config,
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Files to ingest (.json files hold an array of documents, anything
    /// else is ingested as a single plain-text document)
    pub files: Vec<PathBuf>,

    /// Inline document text (repeatable)
    #[arg(short, long)]
    pub text: Vec<String>,
}

/// Arguments for the query command.
#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Question to answer
    pub question: String,

    /// Always consult the knowledge base, skipping the retrieval decision
    #[arg(long)]
    pub force_retrieve: bool,
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,
}

/// Arguments for the delete command.
#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Document IDs to delete
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_flags() {
        let cli = Cli::parse_from(["selfrag", "--format", "json", "query", "Why?", "--force-retrieve"]);
        assert_eq!(cli.format, Some(CliFormat::Json));
        match cli.command {
            Command::Query(args) => {
                assert_eq!(args.question, "Why?");
                assert!(args.force_retrieve);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_delete_requires_ids() {
        assert!(Cli::try_parse_from(["selfrag", "delete"]).is_err());
    }

    #[test]
    fn test_ingest_collects_inline_text() {
        let cli = Cli::parse_from(["selfrag", "ingest", "-t", "one", "-t", "two", "notes.txt"]);
        match cli.command {
            Command::Ingest(args) => {
                assert_eq!(args.text, vec!["one", "two"]);
                assert_eq!(args.files, vec![PathBuf::from("notes.txt")]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
