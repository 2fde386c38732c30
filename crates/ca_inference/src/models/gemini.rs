use std::fmt;

use async_trait::async_trait;
use ca_core::{Error, Result, SummaryRequest, TextModel};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::non_empty;
use crate::prompts::{chat_prompt, summary_prompt};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-pro";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Google's generative language API, the primary provider.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(client: Client, api_key: String, model: Option<String>, base_url: Option<String>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Inference("Gemini API key is required".to_string()));
        }
        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        debug!(model = %self.model, chars = text.len(), "gemini replied");
        non_empty(self.name(), text)
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        self.generate(summary_prompt(request)).await
    }

    async fn respond(&self, message: &str) -> Result<String> {
        self.generate(chat_prompt(message)).await
    }
}
