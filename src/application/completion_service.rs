// Completion service trait - the language model boundary
use crate::domain::conversation::Message;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    /// Any non-text block, identified by its type name.
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: Vec<ContentBlock>,
}

impl Completion {
    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(text.into())],
        }
    }

    /// The payload of interest: the first block, when it is text.
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(ContentBlock::Text(text)) => Some(text),
            _ => None,
        }
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Single-shot completion, no streaming.
    async fn complete(&self, request: CompletionRequest) -> anyhow::Result<Completion>;
}
