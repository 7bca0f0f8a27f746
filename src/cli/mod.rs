//! CLI module for formcheck.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Formcheck - Evidence-Based Fitness Video Analysis
///
/// Analyzes a fitness video's workout against a corpus of research papers
/// and reports whether the routine holds up.
#[derive(Parser, Debug)]
#[command(name = "formcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a fitness video against the research corpus
    Analyze {
        /// YouTube video URL
        url: String,

        /// Directory of research paper PDFs (overrides configuration)
        #[arg(short, long)]
        papers: Option<String>,

        /// Print the raw JSON report instead of formatted output
        #[arg(long)]
        json: bool,
    },

    /// Search the knowledge base for relevant chunks
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// List ingested sources
    Sources,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
