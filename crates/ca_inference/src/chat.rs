use std::sync::Arc;

use ca_core::TextModel;
use tracing::{info, warn};

pub const FALLBACK_REPLY: &str = "I apologize, but I'm having trouble processing your request right now. \
Please try again later or contact support. For immediate assistance, you can browse our updates or check the JAMB official website.";

/// Answers visitor questions with the same provider cascade as the summarizer.
#[derive(Debug, Clone, Default)]
pub struct ChatAssistant {
    providers: Vec<Arc<dyn TextModel>>,
}

impl ChatAssistant {
    pub fn new(providers: Vec<Arc<dyn TextModel>>) -> Self {
        Self { providers }
    }

    pub async fn reply(&self, message: &str) -> String {
        for provider in &self.providers {
            match provider.respond(message).await {
                Ok(reply) => {
                    info!(provider = provider.name(), "chat answered");
                    return reply;
                }
                Err(e) => warn!(provider = provider.name(), error = %e, "chat provider failed"),
            }
        }
        FALLBACK_REPLY.to_string()
    }
}
