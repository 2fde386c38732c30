use ca_core::{Category, Result};
use clap::{Args, Subcommand};
use tracing::info;

use crate::manager::{IngestManager, RunReport};

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Scrape one source by slug (e.g. unilag, jamb). If not specified, runs every source.
    Source {
        #[arg(required = false)]
        source: Option<String>,
    },
    /// List configured sources
    List {
        #[arg(long)]
        category: Option<Category>,
    },
    /// Fetch a page and print the extracted candidates without storing them
    Url { url: String },
}

pub async fn handle_command(args: ScraperArgs, manager: &IngestManager) -> Result<()> {
    match args.command {
        ScraperCommands::Source { source } => {
            let report = match source.as_deref().filter(|s| !s.is_empty()) {
                Some(slug) => manager.run_source(slug).await?,
                None => manager.run_all().await?,
            };
            print_report(&report);
        }
        ScraperCommands::List { category } => {
            for line in source_lines(manager, category) {
                println!("{}", line);
            }
        }
        ScraperCommands::Url { url } => {
            info!(url = %url, "previewing page");
            let candidates = manager.preview(&url).await?;
            println!("Found {} candidates", candidates.len());
            for candidate in candidates {
                println!(
                    "- {} ({})\n  {} chars{}",
                    candidate.title,
                    candidate.link,
                    candidate.body.chars().count(),
                    candidate.date.map(|d| format!(", dated {}", d)).unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

fn source_lines(manager: &IngestManager, category: Option<Category>) -> Vec<String> {
    let registry = manager.registry();
    registry
        .sources()
        .iter()
        .chain(std::iter::once(registry.exam_board()))
        .filter(|s| category.map_or(true, |c| s.category == c))
        .map(|s| format!("{:<24} {:<8} {}", s.slug, s.category.as_str(), s.url))
        .collect()
}

fn print_report(report: &RunReport) {
    println!(
        "Processed {} articles: {} saved, {} already stored, {} failed ({} of {} sources unreachable)",
        report.processed,
        report.saved,
        report.duplicates,
        report.failed,
        report.sources_failed,
        report.sources_attempted
    );
}
