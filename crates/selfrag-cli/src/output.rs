//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use selfrag_pipeline::{IngestOutcome, QueryResult};
use serde::Serialize;

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Whether machine-readable output was requested.
    pub fn is_json(&self) -> bool {
        self.format == CliFormat::Json
    }

    /// Render any serializable value as pretty JSON.
    pub fn json<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Format a query result with its reflection trace.
    pub fn query_result(&self, result: &QueryResult) -> Result<String> {
        if self.is_json() {
            return self.json(result);
        }

        let trace = &result.reflection_trace;
        let mut lines = vec![result.answer.clone().unwrap_or_default(), String::new()];

        if let Some(decision) = &trace.retrieval_decision {
            lines.push(self.label(&format!(
                "retrieval decision: {} (confidence {:.2}) {}",
                if decision.should_retrieve { "retrieve" } else { "skip" },
                decision.confidence,
                decision.reasoning
            )));
        }
        if let Some(note) = &trace.note {
            lines.push(self.label(note));
        }
        if let Some(grading) = &trace.relevance_grading {
            let scores: Vec<String> = grading.scores.iter().map(|s| s.score.to_string()).collect();
            lines.push(self.label(&format!(
                "relevance: {}/{} documents kept, scores [{}]",
                grading.relevant_count,
                grading.total_retrieved,
                scores.join(", ")
            )));
        } else if trace.retrieval_used {
            lines.push(self.label("relevance: nothing retrieved"));
        }
        if let Some(support) = &trace.support_check {
            let status = format!("support: {} (confidence {:.2})", support.level, support.confidence);
            lines.push(if support.is_supported {
                self.colorize(&status, "green")
            } else {
                self.colorize(&status, "yellow")
            });
        }
        for error in &trace.errors {
            lines.push(self.error(error));
        }

        Ok(lines.join("\n").trim_end().to_string())
    }

    /// Format an ingestion outcome.
    pub fn ingest_outcome(&self, outcome: &IngestOutcome) -> Result<String> {
        if self.is_json() {
            return self.json(outcome);
        }
        if !outcome.success {
            return Ok(self.error(outcome.error.as_deref().unwrap_or("Ingestion failed")));
        }

        let ids = outcome.ids.as_deref().unwrap_or_default();
        Ok(self.success(&format!(
            "Ingested {} document(s): {} ({} total)",
            ids.len(),
            ids.join(", "),
            outcome.total_count.unwrap_or_default()
        )))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    fn label(&self, text: &str) -> String {
        self.colorize(text, "cyan")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfrag_domain::DocumentId;

    #[test]
    fn test_ingest_text_format() {
        let formatter = Formatter::new(CliFormat::Text, false);
        let outcome = IngestOutcome::success(&[DocumentId::new("doc_0"), DocumentId::new("doc_1")], 5);
        let output = formatter.ingest_outcome(&outcome).unwrap();
        assert_eq!(output, "✓ Ingested 2 document(s): doc_0, doc_1 (5 total)");
    }

    #[test]
    fn test_ingest_failure_format() {
        let formatter = Formatter::new(CliFormat::Text, false);
        let output = formatter
            .ingest_outcome(&IngestOutcome::failure("empty content"))
            .unwrap();
        assert_eq!(output, "✗ empty content");
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(CliFormat::Json, false);
        let output = formatter
            .ingest_outcome(&IngestOutcome::failure("boom"))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["success"], false);
    }

    #[test]
    fn test_no_color_is_plain() {
        let formatter = Formatter::new(CliFormat::Text, false);
        assert_eq!(formatter.info("hi"), "ℹ hi");
    }
}
