use ca_core::{Error, Result};

pub mod codehelm;
pub mod gemini;

pub use codehelm::CodeHelmModel;
pub use gemini::GeminiModel;

/// A blank reply counts as a provider failure.
pub(crate) fn non_empty(provider: &str, text: String) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::Inference(format!("{} returned an empty reply", provider)));
    }
    Ok(trimmed.to_string())
}
