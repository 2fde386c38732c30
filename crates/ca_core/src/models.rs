use std::fmt;

use async_trait::async_trait;

use crate::text::truncate_chars;
use crate::Result;

/// Characters of article text handed to a provider.
pub const SUMMARY_INPUT_CHARS: usize = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub title: String,
    pub text: String,
}

impl SummaryRequest {
    pub fn new(title: &str, text: &str) -> Self {
        Self {
            title: title.to_string(),
            text: truncate_chars(text, SUMMARY_INPUT_CHARS).to_string(),
        }
    }
}

/// An external text-generation service.
#[async_trait]
pub trait TextModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Summarize an article in a few sentences
    async fn summarize(&self, request: &SummaryRequest) -> Result<String>;

    /// Answer a visitor's chat message
    async fn respond(&self, message: &str) -> Result<String>;
}
