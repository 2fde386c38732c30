use std::sync::Arc;
use std::time::Duration;

use ca_core::{Category, Error, NewUpdate, RawCandidate, Registry, Result, Source, UpdateStorage};
use ca_inference::Summarizer;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::fetcher::PageFetcher;
use crate::scrapers::{ExtractionRules, Extractor};

pub const DEFAULT_MAX_SOURCES: usize = 50;
pub const DEFAULT_MAX_ARTICLES_PER_SOURCE: usize = 10;

/// Fixed sleeps that keep a run gentle on target sites and the summarization API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After each persisted article
    pub article_delay: Duration,
    /// After each registry source
    pub source_delay: Duration,
}

impl Pacing {
    pub const fn none() -> Self {
        Self {
            article_delay: Duration::ZERO,
            source_delay: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            article_delay: Duration::from_secs(2),
            source_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    pub max_sources: usize,
    pub max_articles_per_source: usize,
    pub pacing: Pacing,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_sources: DEFAULT_MAX_SOURCES,
            max_articles_per_source: DEFAULT_MAX_ARTICLES_PER_SOURCE,
            pacing: Pacing::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub sources_attempted: usize,
    pub sources_failed: usize,
    /// Accepted by the extractor
    pub candidates: usize,
    /// Candidates within the per-source limit that went through the dedup gate
    pub processed: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn merge(&mut self, other: RunReport) {
        self.sources_attempted += other.sources_attempted;
        self.sources_failed += other.sources_failed;
        self.candidates += other.candidates;
        self.processed += other.processed;
        self.saved += other.saved;
        self.duplicates += other.duplicates;
        self.failed += other.failed;
    }
}

enum Outcome {
    Saved,
    Duplicate,
}

/// Drives fetch, extract, dedup, summarize and persist over the registry.
pub struct IngestManager {
    registry: Arc<Registry>,
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Summarizer,
    storage: Arc<dyn UpdateStorage>,
    config: IngestConfig,
    generic: Extractor,
    exam_board: Extractor,
    run_lock: Mutex<()>,
}

impl IngestManager {
    pub fn new(
        registry: Arc<Registry>,
        fetcher: Arc<dyn PageFetcher>,
        summarizer: Summarizer,
        storage: Arc<dyn UpdateStorage>,
        config: IngestConfig,
    ) -> Result<Self> {
        Ok(Self {
            registry,
            fetcher,
            summarizer,
            storage,
            config,
            generic: Extractor::new(&ExtractionRules::generic())?,
            exam_board: Extractor::new(&ExtractionRules::exam_board())?,
            run_lock: Mutex::new(()),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn storage(&self) -> &Arc<dyn UpdateStorage> {
        &self.storage
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// One full pass: the registry prefix, then the exam board.
    pub async fn run_all(&self) -> Result<RunReport> {
        let _guard = self.run_lock.lock().await;
        let mut report = RunReport::default();

        let sources = self.registry.sources();
        let limit = self.config.max_sources.min(sources.len());
        info!(sources = limit, "starting ingestion run");

        for source in &sources[..limit] {
            report.merge(self.process_source(source).await);
            pause(self.config.pacing.source_delay).await;
        }
        report.merge(self.process_source(self.registry.exam_board()).await);

        info!(
            processed = report.processed,
            saved = report.saved,
            duplicates = report.duplicates,
            failed = report.failed,
            sources_failed = report.sources_failed,
            "ingestion run complete"
        );
        Ok(report)
    }

    pub async fn run_source(&self, slug: &str) -> Result<RunReport> {
        let source = self
            .registry
            .find(slug)
            .ok_or_else(|| Error::Config(format!("Unknown source: {}", slug)))?;
        let _guard = self.run_lock.lock().await;
        Ok(self.process_source(source).await)
    }

    /// Fetch and extract a page without touching storage.
    pub async fn preview(&self, url: &str) -> Result<Vec<RawCandidate>> {
        let page_url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        let extractor = if is_exam_board(&page_url) { &self.exam_board } else { &self.generic };
        let markup = self.fetcher.fetch(page_url.host_str().unwrap_or("preview"), url).await?;
        Ok(extractor.extract(&markup, &page_url))
    }

    async fn process_source(&self, source: &Source) -> RunReport {
        let mut report = RunReport {
            sources_attempted: 1,
            ..Default::default()
        };

        let (extractor, scope) = match source.category {
            Category::Jamb => (&self.exam_board, Some(Category::Jamb)),
            _ => (&self.generic, None),
        };

        let page_url = match Url::parse(&source.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(source = %source.slug, error = %e, "invalid source url");
                report.sources_failed = 1;
                return report;
            }
        };

        info!(source = %source.name, url = %source.url, "fetching updates");
        let markup = match self.fetcher.fetch(&source.slug, &source.url).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!(source = %source.slug, error = %e, "fetch failed");
                report.sources_failed = 1;
                return report;
            }
        };

        let candidates = extractor.extract(&markup, &page_url);
        report.candidates = candidates.len();
        if candidates.is_empty() {
            info!(source = %source.slug, "no articles found");
            return report;
        }

        for candidate in candidates.into_iter().take(self.config.max_articles_per_source) {
            report.processed += 1;
            let title = candidate.title.clone();
            match self.process_candidate(source, scope, candidate).await {
                Ok(Outcome::Saved) => {
                    report.saved += 1;
                    info!(source = %source.slug, title = %title, "saved update");
                    pause(self.config.pacing.article_delay).await;
                }
                Ok(Outcome::Duplicate) => {
                    report.duplicates += 1;
                    debug!(source = %source.slug, title = %title, "already stored");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(source = %source.slug, title = %title, error = %e, "failed to process article");
                }
            }
        }
        report
    }

    async fn process_candidate(
        &self,
        source: &Source,
        scope: Option<Category>,
        candidate: RawCandidate,
    ) -> Result<Outcome> {
        if self.storage.exists(&candidate.link, scope).await? {
            return Ok(Outcome::Duplicate);
        }

        let summary = self.summarizer.summarize(&candidate.body, &candidate.title).await;
        let update = NewUpdate::from_candidate(candidate, summary, source, Utc::now());
        match self.storage.save(update).await {
            Ok(_) => Ok(Outcome::Saved),
            Err(Error::Duplicate(_)) => Ok(Outcome::Duplicate),
            Err(e) => Err(e),
        }
    }
}

fn is_exam_board(url: &Url) -> bool {
    Url::parse(Source::EXAM_BOARD_URL)
        .map(|board| board.host_str() == url.host_str())
        .unwrap_or(false)
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
