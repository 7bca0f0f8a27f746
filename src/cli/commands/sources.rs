//! Sources command: list ingested sources.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::store::ChunkStore;

/// Run the sources command.
pub async fn run_sources(settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let sources = orchestrator.chunk_store().list_sources().await?;

    if sources.is_empty() {
        Output::info("The knowledge base is empty. Run `formcheck analyze` to ingest content.");
        return Ok(());
    }

    Output::header("Ingested sources");
    for source in &sources {
        Output::list_item(&format!(
            "{} ({}, {} chunks)",
            source.source_id, source.source_type, source.chunk_count
        ));
    }
    println!();

    Ok(())
}
