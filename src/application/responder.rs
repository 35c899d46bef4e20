// Conversational responder - plain text reply anchored on the action label
use crate::application::completion_service::{CompletionRequest, CompletionService};
use crate::domain::conversation::Message;
use crate::infrastructure::config::render_template;
use std::collections::HashMap;
use std::sync::Arc;

pub const RESPONSE_ERROR: &str = "Error generating response.";
pub const NO_RESPONSE: &str = "No response generated.";

const SYSTEM_TEMPLATE: &str = "You are an AI assistant. You will be given a conversation history and a planned action that has been determined to help the user.

THE PLANNED ACTION IS: \"${action}\"

Your goal is to execute this action and provide a helpful, natural response to the user.
Use the planned action as your guide for what to say or do.";

#[derive(Clone)]
pub struct Responder {
    completion: Arc<dyn CompletionService>,
    max_tokens: u32,
}

impl Responder {
    pub fn new(completion: Arc<dyn CompletionService>, max_tokens: u32) -> Self {
        Self {
            completion,
            max_tokens,
        }
    }

    pub async fn respond(&self, messages: &[Message], action: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("action".to_string(), action.to_string());

        let request = CompletionRequest {
            system: render_template(SYSTEM_TEMPLATE, &vars),
            messages: messages.to_vec(),
            max_tokens: self.max_tokens,
        };

        match self.completion.complete(request).await {
            Ok(completion) => completion.first_text().unwrap_or(NO_RESPONSE).to_string(),
            Err(e) => {
                tracing::error!("Error in responder: {:#}", e);
                RESPONSE_ERROR.to_string()
            }
        }
    }
}
