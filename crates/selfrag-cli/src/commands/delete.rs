//! Delete command implementation.

use crate::backend::CliPipeline;
use crate::cli::DeleteArgs;
use crate::error::Result;
use crate::output::Formatter;
use selfrag_domain::traits::KnowledgeStore;
use selfrag_domain::DocumentId;

/// Execute the delete command.
pub fn execute_delete(args: DeleteArgs, pipeline: &mut CliPipeline, formatter: &Formatter) -> Result<()> {
    let ids: Vec<DocumentId> = args.ids.iter().map(|id| DocumentId::new(id.trim())).collect();

    let store = pipeline.store_mut();
    let before = store.count()?;
    store.delete(&ids)?;
    let removed = before.saturating_sub(store.count()?);

    if formatter.is_json() {
        println!(
            "{}",
            formatter.json(&serde_json::json!({ "requested": ids.len(), "deleted": removed }))?
        );
    } else {
        println!("{}", formatter.success(&format!("Deleted {} document(s)", removed)));
        if removed < ids.len() {
            println!(
                "{}",
                formatter.info(&format!("{} identifier(s) were not found", ids.len().saturating_sub(removed)))
            );
        }
    }
    Ok(())
}
