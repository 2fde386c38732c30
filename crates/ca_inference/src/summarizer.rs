use std::sync::Arc;

use ca_core::text::truncate_chars;
use ca_core::{SummaryRequest, TextModel};
use tracing::{debug, warn};

/// Characters kept when every provider fails.
pub const FALLBACK_SUMMARY_CHARS: usize = 200;

/// Tries each provider once, in order, and never fails.
#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    providers: Vec<Arc<dyn TextModel>>,
}

impl Summarizer {
    pub fn new(providers: Vec<Arc<dyn TextModel>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn TextModel>] {
        &self.providers
    }

    pub async fn summarize(&self, text: &str, title: &str) -> String {
        let request = SummaryRequest::new(title, text);
        for provider in &self.providers {
            match provider.summarize(&request).await {
                Ok(summary) => {
                    debug!(provider = provider.name(), "summary generated");
                    return summary;
                }
                Err(e) => warn!(provider = provider.name(), error = %e, "summarization failed"),
            }
        }
        warn!(title, "all providers failed, truncating article text");
        truncation_summary(text)
    }
}

pub fn truncation_summary(text: &str) -> String {
    format!("{}...", truncate_chars(text, FALLBACK_SUMMARY_CHARS))
}
