use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ca_core::deadlines::{next_deadline, Countdown};
use ca_core::{Category, Registry};
use ca_inference::{create_providers, ChatAssistant, Summarizer};
use ca_scrapers::cli::{handle_command, ScraperArgs, ScraperCommands};
use ca_scrapers::logging::init_logging;
use ca_scrapers::{HttpFetcher, IngestConfig, IngestManager, Pacing};
use ca_storage::{create_storage, StorageKind};
use ca_web::{create_app, AppState};
use chrono::Utc;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    /// Accepts runs of `<number><unit>` with units s, m, h and d, e.g. `1h30m` or `1d 2h`.
    /// A trailing bare number counts as seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut seconds = 0u64;
        let mut digits = String::new();
        let mut parts = 0;

        for c in s.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            if digits.is_empty() {
                if c.is_whitespace() {
                    continue;
                }
                return Err(format!("Expected a number before '{}'", c));
            }
            let scale = match c {
                's' => 1,
                'm' => 60,
                'h' => 3_600,
                'd' => 86_400,
                _ => return Err(format!("Unknown duration unit: {}", c)),
            };
            seconds = add_scaled(seconds, &digits, scale)?;
            digits.clear();
            parts += 1;
        }

        if !digits.is_empty() {
            seconds = add_scaled(seconds, &digits, 1)?;
            parts += 1;
        }
        if parts == 0 {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(seconds)))
    }
}

fn add_scaled(total: u64, digits: &str, scale: u64) -> std::result::Result<u64, String> {
    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .and_then(|n| total.checked_add(n))
        .ok_or_else(|| format!("Duration too large: {}", digits))
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Nigerian university and JAMB news ingestion", long_about = None)]
struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, env = "CAMPUS_STORAGE", default_value = "memory")]
    storage: StorageKind,
    /// SQLite path or sqlite: URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,
    #[arg(long, env = "GEMINI_MODEL")]
    gemini_model: Option<String>,
    #[arg(long, env = "GEMINI_BASE_URL")]
    gemini_base_url: Option<String>,
    #[arg(long, env = "CODEHELM_API_KEY", hide_env_values = true)]
    codehelm_api_key: Option<String>,
    #[arg(long, env = "CODEHELM_BASE_URL")]
    codehelm_base_url: Option<String>,
    /// Bearer token required by POST /api/scrape
    #[arg(long, env = "CRON_SECRET", hide_env_values = true)]
    cron_secret: Option<String>,
    /// Replace the bundled source list
    #[arg(long, env = "CAMPUS_SOURCES_PATH")]
    sources_file: Option<PathBuf>,
    /// Replace the bundled deadline list
    #[arg(long, env = "CAMPUS_DEADLINES_PATH")]
    deadlines_file: Option<PathBuf>,
    #[arg(long, default_value_t = ca_scrapers::manager::DEFAULT_MAX_SOURCES)]
    max_sources: usize,
    #[arg(long, default_value_t = ca_scrapers::manager::DEFAULT_MAX_ARTICLES_PER_SOURCE)]
    max_articles: usize,
    /// Pause after each saved article (e.g. 2s)
    #[arg(long, default_value = "2s")]
    article_delay: HumanDuration,
    /// Pause after each source (e.g. 3s)
    #[arg(long, default_value = "3s")]
    source_delay: HumanDuration,
    #[arg(long, default_value = "10s")]
    fetch_timeout: HumanDuration,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run ingestion for every source, or a single one by slug
    Scrape {
        #[arg(required = false)]
        source: Option<String>,
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
        addr: String,
        /// Also run ingestion in the background at this interval
        #[arg(long)]
        scrape_interval: Option<HumanDuration>,
    },
    /// List configured sources
    Sources {
        #[arg(long)]
        category: Option<Category>,
    },
    /// Fetch a page and print extracted candidates without storing them
    Preview { url: String },
    /// Show known deadlines and the countdown to the next one
    Deadlines,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env is fine
    let _ = dotenvy::dotenv();
    init_logging();
    let cli = Cli::parse();

    let registry = Arc::new(
        Registry::load(cli.sources_file.as_deref(), cli.deadlines_file.as_deref())
            .context("failed to load source registry")?,
    );
    info!(
        sources = registry.sources().len(),
        deadlines = registry.deadlines().len(),
        "registry loaded"
    );

    if let Commands::Deadlines = cli.command {
        print_deadlines(&registry);
        return Ok(());
    }

    let storage = create_storage(cli.storage, cli.database_url.as_deref()).await?;
    info!(backend = %cli.storage, "storage ready");

    let providers = create_providers(&ca_inference::Config {
        gemini_api_key: cli.gemini_api_key.clone(),
        gemini_model: cli.gemini_model.clone(),
        gemini_base_url: cli.gemini_base_url.clone(),
        codehelm_api_key: cli.codehelm_api_key.clone(),
        codehelm_base_url: cli.codehelm_base_url.clone(),
        timeout: None,
    })?;

    let manager = Arc::new(IngestManager::new(
        registry,
        Arc::new(HttpFetcher::with_timeout(cli.fetch_timeout.0)?),
        Summarizer::new(providers.clone()),
        storage,
        IngestConfig {
            max_sources: cli.max_sources,
            max_articles_per_source: cli.max_articles,
            pacing: Pacing {
                article_delay: cli.article_delay.0,
                source_delay: cli.source_delay.0,
            },
        },
    )?);

    match cli.command {
        Commands::Scrape { source, interval } => {
            let args = ScraperArgs {
                command: ScraperCommands::Source { source },
            };
            match interval {
                Some(interval) => run_periodically(args, &manager, interval.0).await,
                None => {
                    tokio::select! {
                        result = handle_command(args, &manager) => result?,
                        _ = signal::ctrl_c() => warn!("interrupted, stopping scrape"),
                    }
                }
            }
        }
        Commands::Serve { addr, scrape_interval } => {
            let state = AppState::new(manager.clone(), ChatAssistant::new(providers), cli.cron_secret);
            if let Some(interval) = scrape_interval {
                spawn_scheduler(manager, interval.0);
            }
            serve(&addr, state).await?;
        }
        Commands::Sources { category } => {
            handle_command(
                ScraperArgs {
                    command: ScraperCommands::List { category },
                },
                &manager,
            )
            .await?;
        }
        Commands::Preview { url } => {
            handle_command(
                ScraperArgs {
                    command: ScraperCommands::Url { url },
                },
                &manager,
            )
            .await?;
        }
        Commands::Deadlines => {}
    }

    Ok(())
}

async fn run_periodically(args: ScraperArgs, manager: &IngestManager, interval: Duration) {
    info!("Running in periodic mode with {}s interval", interval.as_secs());
    loop {
        info!("Starting scrape cycle");
        tokio::select! {
            result = handle_command(args.clone(), manager) => {
                if let Err(e) = result {
                    error!(error = %e, "scrape cycle failed");
                }
            }
            _ = signal::ctrl_c() => break,
        }

        info!("Waiting {}s before next scrape", interval.as_secs());
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = signal::ctrl_c() => break,
        }
    }
    warn!("interrupted, stopping periodic scrape");
}

fn spawn_scheduler(manager: Arc<IngestManager>, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "background ingestion enabled");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            match manager.run_all().await {
                Ok(report) => info!(count = report.processed, saved = report.saved, "scheduled run finished"),
                Err(e) => error!(error = %e, "scheduled run failed"),
            }
        }
    });
}

async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

fn print_deadlines(registry: &Registry) {
    let now = Utc::now();
    for event in registry.deadlines() {
        let when = event
            .deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "TBA".to_string());
        println!("{:<12} {:<14} {}", when, event.category, event.title);
    }

    let next = next_deadline(registry.deadlines(), now)
        .and_then(|event| Some((event, Countdown::until(event.deadline?, now)?)));
    match next {
        Some((event, c)) => println!(
            "\nNext: {} in {}d {}h {}m {}s",
            event.title, c.days, c.hours, c.minutes, c.seconds
        ),
        None => println!("\nNo upcoming deadlines"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn human_duration_parses_compound_values() {
        assert_eq!("2s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(2));
        assert_eq!("1h30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(5400));
        assert_eq!("1d 2h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(93_600));
        assert_eq!("45".parse::<HumanDuration>().unwrap().0, Duration::from_secs(45));
        assert_eq!("0s".parse::<HumanDuration>().unwrap().0, Duration::ZERO);
        assert!("".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
        assert!("abc".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn human_duration_rejects_overflow() {
        assert!("99999999999999999d".parse::<HumanDuration>().is_err());
        assert!("99999999999999999999".parse::<HumanDuration>().is_err());
        assert!(format!("{}s 1s", u64::MAX).parse::<HumanDuration>().is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scrape_with_interval() {
        let cli = Cli::try_parse_from(["campus", "--storage", "sqlite", "scrape", "unilag", "--interval", "1h"]).unwrap();
        assert_eq!(cli.storage, StorageKind::SQLite);
        match cli.command {
            Commands::Scrape { source, interval } => {
                assert_eq!(source.as_deref(), Some("unilag"));
                assert_eq!(interval.unwrap().0, Duration::from_secs(3600));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_sources_category() {
        let cli = Cli::try_parse_from(["campus", "sources", "--category", "private"]).unwrap();
        assert!(matches!(cli.command, Commands::Sources { category: Some(Category::Private) }));
    }
}
