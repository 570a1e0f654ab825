#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

//! Paperscribe: the engine behind a local-LLM drafting studio for academic
//! papers. Users keep bulleted notes per section; a local text-generation
//! backend reformats them into prose for a live preview; a chat assistant
//! answers free-form questions; drafts persist per authenticated user.
//!
//! The presentation layer embeds [`AppState`] and observes its outputs; this
//! crate has no UI of its own.

pub mod app;
pub mod auth;
pub mod chat;
pub mod config;
pub mod drafts;
pub mod error;
pub mod llm;
pub mod observability;
pub mod paper;

pub use app::{AppState, Notice};
pub use config::Config;
pub use error::{Result, ScribeError};
