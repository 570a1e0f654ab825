use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One unit of the working draft: free-text title, raw bulleted notes, and
/// the citations to weave in. The id is assigned at creation, unique within
/// the working set, and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub content: String,
    pub citations: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: String::new(),
            citations: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_citations(mut self, citations: Vec<String>) -> Self {
        self.citations = citations;
        self
    }

    /// Whether the section has anything worth sending to the backend.
    pub fn has_notes(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// One field mutation applied to a section by id.
#[derive(Debug, Clone)]
pub enum SectionEdit {
    Title(String),
    Content(String),
    Citations(Vec<String>),
}

/// Prose derived from one section of a cycle snapshot. Content is the
/// backend's paragraph, the raw notes as fallback, or empty for a section
/// that had no notes. Reflects the section as of the snapshot, not
/// necessarily the latest edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSection {
    pub section_id: String,
    pub title: String,
    pub content: String,
}
