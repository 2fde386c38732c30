pub mod cli;
pub mod fetcher;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use manager::{IngestConfig, IngestManager, Pacing, RunReport};
pub use scrapers::{ExtractionRules, Extractor};

pub mod prelude {
    pub use super::fetcher::PageFetcher;
    pub use super::manager::{IngestManager, RunReport};
    pub use ca_core::{Error, RawCandidate, Result};
}
