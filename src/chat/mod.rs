pub mod engine;
pub mod service;
pub mod types;

pub use engine::{ConversationLog, WELCOME_MESSAGE};
pub use service::Assistant;
pub use types::{ConversationState, Message, Role};
