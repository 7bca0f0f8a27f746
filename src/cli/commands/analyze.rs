//! Analyze command: run the full video analysis.

use crate::analysis::AnalysisReport;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Context;
use std::path::PathBuf;

/// Run the analyze command.
pub async fn run_analyze(
    url: &str,
    papers: Option<String>,
    json: bool,
    settings: Settings,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let papers_dir = papers.map(PathBuf::from);

    let spinner = Output::spinner("Analyzing video against the research corpus...");
    let result = orchestrator
        .run_analysis(url, papers_dir.as_deref())
        .await;
    spinner.finish_and_clear();

    let report = result.context("analysis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    Output::header(&report.video_title);

    Output::header("Good points");
    if report.analysis.good_points.is_empty() {
        println!("  (none identified)");
    }
    for point in &report.analysis.good_points {
        Output::list_item(point);
    }

    Output::header("Bad points");
    if report.analysis.bad_points.is_empty() {
        println!("  (none identified)");
    }
    for point in &report.analysis.bad_points {
        Output::list_item(point);
    }

    Output::header("Workout plan");
    println!("  {}", report.analysis.workout_plan);

    Output::header("Scientific backing");
    println!("  {}", report.analysis.scientific_backing);

    Output::header("Conclusion");
    println!("  {}", report.analysis.conclusion);
    println!();
}
