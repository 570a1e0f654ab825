use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for Paperscribe.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ScribeError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Completion backend ───────────────────────────────────────────────
    #[error("completion: {0}")]
    Completion(#[from] CompletionError),

    // ── Conversation ─────────────────────────────────────────────────────
    #[error("chat: {0}")]
    Chat(#[from] ChatError),

    // ── Drafts / persistence ─────────────────────────────────────────────
    #[error("drafts: {0}")]
    Draft(#[from] DraftError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Completion backend errors ──────────────────────────────────────────────

/// Failures talking to the text-generation backend.
///
/// Every variant carries the caller-usable fallback payload: the raw section
/// notes for a formatting request, a static apology line for a chat request.
/// Downstream surfaces must never render empty content because of a backend
/// failure, so the fallback is part of the contract, not a convenience.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("backend request failed: {message}")]
    Transport { message: String, fallback: String },

    #[error("backend returned an unusable body: {message}")]
    MalformedResponse { message: String, fallback: String },
}

impl CompletionError {
    pub fn transport(message: impl Into<String>, fallback: &str) -> Self {
        Self::Transport {
            message: message.into(),
            fallback: fallback.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>, fallback: &str) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            fallback: fallback.to_string(),
        }
    }

    /// The text to show in place of the completion.
    pub fn fallback(&self) -> &str {
        match self {
            Self::Transport { fallback, .. } | Self::MalformedResponse { fallback, .. } => fallback,
        }
    }

    pub fn into_fallback(self) -> String {
        match self {
            Self::Transport { fallback, .. } | Self::MalformedResponse { fallback, .. } => fallback,
        }
    }
}

// ─── Conversation errors ────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChatError {
    #[error("message text is empty")]
    EmptyInput,

    #[error("an assistant response is already pending")]
    Busy,

    #[error("no turn is awaiting a response")]
    NoTurnInProgress,
}

// ─── Draft / persistence errors ─────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft title must not be empty")]
    EmptyTitle,

    #[error("sign-in required")]
    AuthRequired,

    #[error("draft {0} not found")]
    NotFound(String),

    #[error("schema: {0}")]
    Schema(#[from] SchemaIssue),

    #[error("store: {0}")]
    Store(String),

    #[error("draft content encoding: {0}")]
    Encoding(String),
}

/// The two record-store schema conditions that must surface distinctly, each
/// with the exact corrective statement an operator can run.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SchemaIssue {
    #[error("the drafts table is missing the owner column")]
    MissingOwnerColumn,

    #[error("the drafts table does not exist")]
    MissingDraftsTable,
}

impl SchemaIssue {
    /// The corrective statement to surface to the operator, verbatim.
    pub fn remediation(self) -> &'static str {
        match self {
            Self::MissingOwnerColumn => "ALTER TABLE drafts ADD COLUMN owner_id TEXT;",
            Self::MissingDraftsTable => {
                "CREATE TABLE drafts (id TEXT PRIMARY KEY, created_at TEXT NOT NULL, \
                 title TEXT NOT NULL, content TEXT NOT NULL, owner_id TEXT NOT NULL);"
            }
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ScribeError>;
