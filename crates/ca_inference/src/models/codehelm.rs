use std::fmt;

use async_trait::async_trait;
use ca_core::{Error, Result, SummaryRequest, TextModel};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::non_empty;
use crate::prompts::CHAT_CONTEXT;

pub const DEFAULT_BASE_URL: &str = "https://api.codehelm.ai";

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
    title: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Secondary provider with dedicated summarize and chat endpoints.
pub struct CodeHelmModel {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CodeHelmModel {
    pub fn new(client: Client, api_key: String, base_url: Option<String>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Inference("CodeHelm API key is required".to_string()));
        }
        Ok(Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
    }
}

impl fmt::Debug for CodeHelmModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeHelmModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TextModel for CodeHelmModel {
    fn name(&self) -> &str {
        "CodeHelm"
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        let response = self
            .post("/v1/summarize")
            .json(&SummarizeRequest {
                text: &request.text,
                title: &request.title,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<SummarizeResponse>()
            .await?;
        non_empty(self.name(), response.summary.unwrap_or_default())
    }

    async fn respond(&self, message: &str) -> Result<String> {
        let response = self
            .post("/v1/chat")
            .json(&ChatRequest {
                message,
                context: CHAT_CONTEXT,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;
        non_empty(self.name(), response.response.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer helm-key")
    }

    #[tokio::test]
    async fn summarize_and_chat_use_their_endpoints() {
        let router = Router::new()
            .route(
                "/v1/summarize",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    assert!(authorized(&headers));
                    assert_eq!(body["title"], "Convocation");
                    Json(json!({"summary": "Convocation holds in March."}))
                }),
            )
            .route(
                "/v1/chat",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    assert!(authorized(&headers));
                    assert_eq!(body["context"], CHAT_CONTEXT);
                    Json(json!({"response": format!("You asked: {}", body["message"].as_str().unwrap_or_default())}))
                }),
            );
        let base = serve(router).await;
        let model = CodeHelmModel::new(Client::new(), "helm-key".to_string(), Some(format!("{}/", base))).unwrap();

        let summary = model
            .summarize(&SummaryRequest::new("Convocation", "The 60th convocation holds in March."))
            .await
            .unwrap();
        assert_eq!(summary, "Convocation holds in March.");
        assert_eq!(model.respond("What is CAPS?").await.unwrap(), "You asked: What is CAPS?");
    }

    #[tokio::test]
    async fn missing_summary_field_is_an_error() {
        let router = Router::new().route("/v1/summarize", post(|| async { Json(json!({})) }));
        let base = serve(router).await;
        let model = CodeHelmModel::new(Client::new(), "helm-key".to_string(), Some(base)).unwrap();

        let result = model.summarize(&SummaryRequest::new("t", "body")).await;
        assert!(matches!(result, Err(Error::Inference(_))));
    }
}
