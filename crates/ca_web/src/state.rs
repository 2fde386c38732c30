use std::sync::Arc;

use ca_core::{Registry, UpdateStorage};
use ca_inference::ChatAssistant;
use ca_scrapers::IngestManager;

pub struct AppState {
    pub manager: Arc<IngestManager>,
    pub assistant: ChatAssistant,
    /// Bearer token required by the scrape trigger, when set
    pub cron_secret: Option<String>,
}

impl AppState {
    pub fn new(manager: Arc<IngestManager>, assistant: ChatAssistant, cron_secret: Option<String>) -> Self {
        Self {
            manager,
            assistant,
            cron_secret: cron_secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn storage(&self) -> &Arc<dyn UpdateStorage> {
        self.manager.storage()
    }

    pub fn registry(&self) -> &Registry {
        self.manager.registry()
    }
}
