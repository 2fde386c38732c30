use ca_core::SummaryRequest;

/// Topic hint sent alongside chat messages to providers that take one.
pub const CHAT_CONTEXT: &str = "Nigerian universities and JAMB updates";

pub fn summary_prompt(request: &SummaryRequest) -> String {
    format!(
        "Summarize the following news article in 2-3 sentences. Focus on key information and important dates:\n\n\
         Title: {}\n\
         Content: {}\n\n\
         Provide a concise summary:",
        request.title, request.text
    )
}

pub fn chat_prompt(message: &str) -> String {
    format!(
        "You are a helpful assistant for CampusAI.ng, a platform providing information about Nigerian universities and JAMB updates. \n\n\
         User question: {}\n\n\
         Provide a helpful, accurate, and concise response. If you don't know something, say so. \
         Focus on Nigerian education system, universities, and JAMB-related information.",
        message
    )
}
