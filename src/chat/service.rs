use super::engine::ConversationLog;
use super::types::{ConversationState, Message};
use crate::error::ChatError;
use crate::llm::Completion;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Drives the conversation log around the completion backend.
///
/// The log lives behind a mutex that is only held across the synchronous
/// state transitions, never across the network await, so readers (and the
/// busy-rejection check) stay responsive while a turn is outstanding.
pub struct Assistant {
    log: Arc<Mutex<ConversationLog>>,
    client: Arc<dyn Completion>,
}

impl Assistant {
    pub fn new(client: Arc<dyn Completion>) -> Self {
        Self {
            log: Arc::new(Mutex::new(ConversationLog::new())),
            client,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConversationLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit one user turn: append the user message, call the backend with
    /// the full history, append the reply (or the apology fallback) exactly
    /// once, and return the appended assistant message.
    pub async fn submit(&self, user_text: &str) -> Result<Message, ChatError> {
        let payload = self.lock().begin_turn(user_text)?;
        let reply = match self.client.chat(&payload).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(%error, "assistant turn fell back to apology");
                error.into_fallback()
            }
        };
        self.lock().finish_turn(reply)
    }

    pub fn history(&self) -> Vec<Message> {
        self.lock().history().to_vec()
    }

    pub fn state(&self) -> ConversationState {
        self.lock().state()
    }

    /// Empty the log. Explicit user action only.
    pub fn clear(&self) {
        self.lock().clear();
    }
}
