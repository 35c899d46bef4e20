// Intent classifier - asks the model for a short action label
use crate::application::completion_service::{CompletionRequest, CompletionService};
use crate::domain::conversation::Message;
use std::sync::Arc;

pub const ACTION_ERROR: &str = "Error determining action.";
pub const NO_ACTION: &str = "No action determined.";

const SYSTEM_PROMPT: &str = "You are an AI assistant that identifies the intent and necessary action from a user conversation.
Your goal is to analyze the user's request and determine the specific action that needs to be taken to fulfill it.
Output ONLY the action description in a clear, concise manner. Do not include any other text or preamble.";

#[derive(Clone)]
pub struct IntentClassifier {
    completion: Arc<dyn CompletionService>,
    max_tokens: u32,
}

impl IntentClassifier {
    pub fn new(completion: Arc<dyn CompletionService>, max_tokens: u32) -> Self {
        Self {
            completion,
            max_tokens,
        }
    }

    /// Free-text action label. Never fails: completion errors come back as
    /// [`ACTION_ERROR`], which routes like any other label.
    pub async fn classify(&self, messages: &[Message]) -> String {
        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            messages: messages.to_vec(),
            max_tokens: self.max_tokens,
        };

        match self.completion.complete(request).await {
            Ok(completion) => {
                let action = completion.first_text().unwrap_or(NO_ACTION).trim().to_string();
                tracing::info!(action = %action, "Determined action");
                action
            }
            Err(e) => {
                tracing::error!("Error in intent classifier: {:#}", e);
                ACTION_ERROR.to_string()
            }
        }
    }
}
