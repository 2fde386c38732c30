use std::sync::Arc;
use std::time::Duration;

use ca_core::{Result, TextModel};
use reqwest::Client;
use tracing::{info, warn};

pub mod chat;
pub mod models;
pub mod prompts;
pub mod summarizer;

pub use chat::ChatAssistant;
pub use summarizer::Summarizer;

use models::{CodeHelmModel, GeminiModel};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
    pub codehelm_api_key: Option<String>,
    pub codehelm_base_url: Option<String>,
    pub timeout: Option<Duration>,
}

fn configured(key: &Option<String>) -> Option<String> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Build the provider cascade, primary first. Providers without a key are left out.
pub fn create_providers(config: &Config) -> Result<Vec<Arc<dyn TextModel>>> {
    let client = Client::builder()
        .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT))
        .build()?;

    let mut providers: Vec<Arc<dyn TextModel>> = Vec::new();
    if let Some(key) = configured(&config.gemini_api_key) {
        providers.push(Arc::new(GeminiModel::new(
            client.clone(),
            key,
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
        )?));
    }
    if let Some(key) = configured(&config.codehelm_api_key) {
        providers.push(Arc::new(CodeHelmModel::new(
            client,
            key,
            config.codehelm_base_url.clone(),
        )?));
    }

    if providers.is_empty() {
        warn!("no text providers configured; summaries will be truncated article text");
    } else {
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        info!(providers = ?names, "text providers ready");
    }
    Ok(providers)
}

pub mod prelude {
    pub use super::chat::ChatAssistant;
    pub use super::summarizer::Summarizer;
    pub use super::{create_providers, Config};
    pub use ca_core::{Error, Result, SummaryRequest, TextModel};
}
