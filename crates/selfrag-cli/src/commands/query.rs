//! Query and ask command implementations.

use crate::backend::CliPipeline;
use crate::cli::{AskArgs, QueryArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the query command.
pub fn execute_query(args: QueryArgs, pipeline: &CliPipeline, formatter: &Formatter) -> Result<()> {
    let question = non_empty(&args.question)?;
    let result = pipeline.query(question, args.force_retrieve);
    println!("{}", formatter.query_result(&result)?);
    Ok(())
}

/// Execute the ask command.
pub fn execute_ask(args: AskArgs, pipeline: &CliPipeline) -> Result<()> {
    let question = non_empty(&args.question)?;
    println!("{}", pipeline.query_simple(question));
    Ok(())
}

fn non_empty(question: &str) -> Result<&str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(CliError::InvalidInput("Question must not be empty".to_string()));
    }
    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_question_is_rejected() {
        assert!(non_empty("   ").is_err());
        assert_eq!(non_empty("  Why?  ").unwrap(), "Why?");
    }
}
