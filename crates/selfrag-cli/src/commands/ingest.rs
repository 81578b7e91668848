//! Ingest command implementation.

use crate::backend::CliPipeline;
use crate::cli::IngestArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use selfrag_domain::{Document, MetadataValue};
use selfrag_pipeline::IngestOutcome;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Execute the ingest command.
///
/// Returns the outcome so the caller can set the exit status.
pub fn execute_ingest(
    args: IngestArgs,
    pipeline: &mut CliPipeline,
    formatter: &Formatter,
) -> Result<IngestOutcome> {
    let mut documents: Vec<Document> = args.text.into_iter().map(Document::new).collect();
    for path in &args.files {
        documents.extend(read_documents(path)?);
    }

    if documents.is_empty() {
        return Err(CliError::InvalidInput(
            "No documents provided; pass files or --text".to_string(),
        ));
    }

    let outcome = pipeline.add_documents(documents);
    println!("{}", formatter.ingest_outcome(&outcome)?);
    Ok(outcome)
}

/// Document definition for JSON input.
#[derive(Debug, Deserialize)]
struct DocumentDefinition {
    content: String,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl DocumentDefinition {
    fn into_document(self) -> Result<Document> {
        let mut document = Document::new(self.content);
        for (key, value) in self.metadata {
            let value = scalar(&key, value)?;
            document = document.with_metadata(key, value);
        }
        Ok(document)
    }
}

fn scalar(key: &str, value: serde_json::Value) -> Result<MetadataValue> {
    use serde_json::Value;

    match value {
        Value::String(s) => Ok(MetadataValue::String(s)),
        Value::Bool(b) => Ok(MetadataValue::Bool(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(MetadataValue::Integer(i)),
            None => n.as_f64().map(MetadataValue::Float).ok_or_else(|| {
                CliError::InvalidInput(format!("Metadata '{}' is out of range", key))
            }),
        },
        _ => Err(CliError::InvalidInput(format!(
            "Metadata '{}' must be a string, number or boolean",
            key
        ))),
    }
}

/// Read documents from a file.
///
/// `.json` files hold an array of `{content, metadata}` objects; any other
/// file becomes one document tagged with its source path.
fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let contents = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let definitions: Vec<DocumentDefinition> = serde_json::from_str(&contents)?;
        return definitions
            .into_iter()
            .map(DocumentDefinition::into_document)
            .collect();
    }

    Ok(vec![
        Document::new(contents).with_metadata("source", path.display().to_string())
    ])
}
