//! Search command: query the knowledge base directly.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let results = orchestrator.search(query, limit).await?;

    if results.is_empty() {
        Output::info("No matching chunks in the knowledge base.");
        return Ok(());
    }

    for result in &results {
        Output::search_result(
            &result.chunk.source_id,
            &result.chunk.source_type.to_string(),
            result.score,
            &result.chunk.text,
        );
    }
    println!();

    Ok(())
}
