use super::types::{ConversationState, Message, Role};
use crate::error::ChatError;
use crate::llm::ChatTurn;
use chrono::Utc;
use uuid::Uuid;

/// Greeting every fresh conversation starts with. The seed is an ordinary
/// log entry and rides along in every history payload.
pub const WELCOME_MESSAGE: &str =
    "Hello! I am your research assistant. How can I help you with your paper today?";

/// Append-only message history plus the turn-taking marker.
///
/// Pure state machine, no I/O: [`super::Assistant`] drives it around the
/// backend call. Messages are ordered by submission, never by network
/// completion, because the user message is appended before any call starts.
pub struct ConversationLog {
    messages: Vec<Message>,
    state: ConversationState,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            messages: vec![Message {
                id: "welcome".to_string(),
                role: Role::Assistant,
                content: WELCOME_MESSAGE.to_string(),
                timestamp: Utc::now().timestamp_millis(),
            }],
            state: ConversationState::Idle,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// Start a user turn: append the user message and return the wire
    /// payload, the full history oldest-first reduced to role + content.
    ///
    /// Blank input and overlapping turns are rejected without touching the
    /// log; the single-outstanding-turn rule is an engine invariant, not a UI
    /// courtesy.
    pub fn begin_turn(&mut self, user_text: &str) -> Result<Vec<ChatTurn>, ChatError> {
        if user_text.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        if self.state == ConversationState::AwaitingResponse {
            return Err(ChatError::Busy);
        }
        self.append(Role::User, user_text.to_string());
        self.state = ConversationState::AwaitingResponse;
        Ok(self
            .messages
            .iter()
            .map(|message| ChatTurn::new(message.role.as_str(), message.content.clone()))
            .collect())
    }

    /// Finish the outstanding turn with the assistant's reply (backend text
    /// or fallback). Exactly one append per begun turn.
    pub fn finish_turn(&mut self, reply: String) -> Result<Message, ChatError> {
        if self.state != ConversationState::AwaitingResponse {
            return Err(ChatError::NoTurnInProgress);
        }
        let message = self.append(Role::Assistant, reply);
        self.state = ConversationState::Idle;
        Ok(message)
    }

    /// Empty the entire log. Explicit user action only; navigation and
    /// reconnection never call this.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn append(&mut self, role: Role, content: String) -> Message {
        let message = Message {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: self.next_timestamp(),
        };
        self.messages.push(message.clone());
        message
    }

    /// Wall clock, bumped past the newest existing entry so ordering survives
    /// clock granularity and adjustment.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        match self.messages.last() {
            Some(newest) => now.max(newest.timestamp + 1),
            None => now,
        }
    }
}
