pub mod client;
pub mod prompt;

pub use client::{CHAT_FALLBACK, ChatTurn, Completion, OllamaClient, build_backend_client};
pub use crate::error::CompletionError;
