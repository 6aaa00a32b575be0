//! Writing-assistant conversation.
//!
//! A conversation is a linear list of prompt/reply pairs with at most one
//! request outstanding. Failures are kept as an inline error on the
//! conversation and also returned to the caller so it can raise a
//! notification. There is no retry and no cancellation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::blocks::Block;

const SOURCE: &str = "application::assistant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Payload handed to a [`TextGenerator`]. `history` holds the exchanges that
/// preceded `prompt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("a request is already in progress")]
    Busy,
    #[error("assistant endpoint is not configured")]
    NotConfigured,
    #[error("assistant request failed: {message}")]
    Transport { message: String },
    #[error("assistant returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("assistant response was invalid: {message}")]
    InvalidResponse { message: String },
}

impl AssistantError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

/// Text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AssistantError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AssistantError> {
        (**self).generate(request).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    pending: bool,
    error: Option<String>,
}

impl Conversation {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Inline error from the most recent failed request.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the send control should be enabled for `prompt`.
    pub fn can_send(&self, prompt: &str) -> bool {
        !self.pending && !prompt.trim().is_empty()
    }

    /// Start a request: record the prompt and mark the conversation pending.
    /// Rejected prompts leave the conversation untouched.
    pub fn begin(&mut self, prompt: &str) -> Result<GenerationRequest, AssistantError> {
        if self.pending {
            return Err(AssistantError::Busy);
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AssistantError::EmptyPrompt);
        }

        let request = GenerationRequest {
            prompt: prompt.to_string(),
            history: self.messages.clone(),
        };
        self.messages.push(ChatMessage::user(prompt));
        self.pending = true;
        self.error = None;
        Ok(request)
    }

    /// Resolve the outstanding request. Pending is cleared on both outcomes.
    pub fn finish(
        &mut self,
        outcome: Result<String, AssistantError>,
    ) -> Result<String, AssistantError> {
        self.pending = false;
        match outcome {
            Ok(reply) => {
                self.messages.push(ChatMessage::assistant(reply.clone()));
                self.error = None;
                Ok(reply)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Turn the assistant reply at `index` into an `ai` block with a fresh id.
    pub fn reply_as_block(&self, index: usize) -> Option<Block> {
        self.messages
            .get(index)
            .filter(|message| message.role == Role::Assistant)
            .map(|message| Block::ai(Uuid::new_v4().to_string(), message.content.clone()))
    }

    pub fn latest_reply_block(&self) -> Option<Block> {
        let index = self
            .messages
            .iter()
            .rposition(|message| message.role == Role::Assistant)?;
        self.reply_as_block(index)
    }

    pub fn clear(&mut self) {
        if !self.pending {
            self.messages.clear();
            self.error = None;
        }
    }
}

/// Clears the pending flag if a send is dropped before it resolves.
struct PendingGuard<'a> {
    conversation: &'a mut Conversation,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.conversation.pending = false;
    }
}

pub struct AssistantPanel<G> {
    generator: G,
    conversation: Conversation,
}

impl<G: TextGenerator> AssistantPanel<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            conversation: Conversation::default(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Send one prompt and wait for the reply.
    pub async fn send(&mut self, prompt: &str) -> Result<String, AssistantError> {
        let request = self.conversation.begin(prompt)?;
        let guard = PendingGuard {
            conversation: &mut self.conversation,
        };

        let outcome = self.generator.generate(&request).await;
        match &outcome {
            Ok(reply) => info!(
                target = SOURCE,
                prompt_chars = request.prompt.chars().count(),
                reply_chars = reply.chars().count(),
                "assistant replied"
            ),
            Err(err) => warn!(target = SOURCE, error = %err, "assistant request failed"),
        }

        guard.conversation.finish(outcome)
    }
}
