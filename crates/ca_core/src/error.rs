use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch {slug}: {reason}")]
    Fetch { slug: String, reason: String },

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to persist update: {0}")]
    Persist(String),

    #[error("Update already stored: {0}")]
    Duplicate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn fetch(slug: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            slug: slug.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
