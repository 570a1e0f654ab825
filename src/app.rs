use crate::auth::IdentityProvider;
use crate::chat::Assistant;
use crate::config::Config;
use crate::drafts::{Draft, DraftManager, DraftStore, SqliteDraftStore, UpdateOutcome};
use crate::error::DraftError;
use crate::llm::{Completion, OllamaClient};
use crate::paper::{Preview, Section, SectionEdit, SectionFormatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// User-facing report emitted on the application notice channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A persistence action failed. `remediation` carries the corrective
    /// statement when the failure was classifiable.
    Persistence {
        message: String,
        remediation: Option<String>,
    },
}

/// The explicit application-state object the presentation layer owns.
///
/// All working-set mutation goes through here; the formatter, assistant, and
/// draft manager expose request/response methods operating on this state, so
/// there are no ambient globals. Failures the user must act on are also
/// posted on a single notice channel the presentation layer drains.
pub struct AppState {
    sections: Vec<Section>,
    formatter: SectionFormatter,
    assistant: Assistant,
    drafts: DraftManager,
    notices: mpsc::UnboundedSender<Notice>,
    notice_rx: Option<mpsc::UnboundedReceiver<Notice>>,
}

impl AppState {
    /// Wire the engine against the configured Ollama-style backend.
    pub fn new(
        config: &Config,
        store: Arc<dyn DraftStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let client: Arc<dyn Completion> = Arc::new(OllamaClient::new(&config.backend));
        Self::with_client(config, client, store, identity)
    }

    /// Open the configured draft store, then wire the engine.
    pub async fn open(
        config: &Config,
        identity: Arc<dyn IdentityProvider>,
    ) -> crate::error::Result<Self> {
        let path = config.storage.resolve_database_path()?;
        let store = SqliteDraftStore::open(&path).await?;
        Ok(Self::new(config, Arc::new(store), identity))
    }

    /// Seam for tests and alternative completion backends.
    pub fn with_client(
        config: &Config,
        client: Arc<dyn Completion>,
        store: Arc<dyn DraftStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let formatter = SectionFormatter::spawn(
            Arc::clone(&client),
            Duration::from_millis(config.preview.debounce_ms),
        );
        let assistant = Assistant::new(client);
        let drafts = DraftManager::new(store, identity);
        let (notices, notice_rx) = mpsc::unbounded_channel();
        let mut state = Self {
            sections: Vec::new(),
            formatter,
            assistant,
            drafts,
            notices,
            notice_rx: Some(notice_rx),
        };
        state.install_sections(seed_sections());
        state
    }

    /// Receiver half of the notice channel. The first caller takes it.
    pub fn take_notices(&mut self) -> Option<mpsc::UnboundedReceiver<Notice>> {
        self.notice_rx.take()
    }

    // ── Working set ──────────────────────────────────────────────────────

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Append a blank section and return it.
    pub fn add_section(&mut self) -> &Section {
        self.sections.push(Section::new("New Section"));
        self.formatter.notify_edit(&self.sections);
        let added = self.sections.len() - 1;
        &self.sections[added]
    }

    pub fn remove_section(&mut self, id: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|section| section.id != id);
        let removed = self.sections.len() != before;
        if removed {
            self.formatter.notify_edit(&self.sections);
        }
        removed
    }

    /// Apply one field edit by id. Ids themselves are immutable.
    pub fn update_section(&mut self, id: &str, edit: SectionEdit) -> bool {
        let Some(section) = self.sections.iter_mut().find(|section| section.id == id) else {
            return false;
        };
        match edit {
            SectionEdit::Title(title) => section.title = title,
            SectionEdit::Content(content) => section.content = content,
            SectionEdit::Citations(citations) => section.citations = citations,
        }
        self.formatter.notify_edit(&self.sections);
        true
    }

    fn install_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections;
        self.formatter.notify_edit(&self.sections);
    }

    // ── Preview ──────────────────────────────────────────────────────────

    pub fn preview(&self) -> Arc<Preview> {
        self.formatter.preview()
    }

    pub fn formatter(&self) -> &SectionFormatter {
        &self.formatter
    }

    // ── Assistant ────────────────────────────────────────────────────────

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    // ── Drafts ───────────────────────────────────────────────────────────

    /// Install a persisted draft's sections as the entire new working set,
    /// discarding the previous one wholesale.
    pub async fn load_draft(&mut self, draft_id: &str) -> Result<(), DraftError> {
        match self.drafts.load(draft_id).await {
            Ok(sections) => {
                self.install_sections(sections);
                Ok(())
            }
            Err(error) => Err(self.report(error)),
        }
    }

    pub async fn save_draft(&self, title: &str) -> Result<Draft, DraftError> {
        self.drafts
            .save(title, &self.sections)
            .await
            .map_err(|error| self.report(error))
    }

    pub async fn update_draft(
        &self,
        draft_id: &str,
        title: &str,
    ) -> Result<UpdateOutcome, DraftError> {
        self.drafts
            .update(draft_id, title, &self.sections)
            .await
            .map_err(|error| self.report(error))
    }

    pub async fn list_drafts(&self) -> Result<Vec<Draft>, DraftError> {
        self.drafts
            .list()
            .await
            .map_err(|error| self.report(error))
    }

    /// Post the failure on the notice channel, then hand it back to the
    /// initiating caller. Persistence failures are never swallowed.
    fn report(&self, error: DraftError) -> DraftError {
        let remediation = match &error {
            DraftError::Schema(issue) => Some(issue.remediation().to_string()),
            _ => None,
        };
        let _ = self.notices.send(Notice::Persistence {
            message: error.to_string(),
            remediation,
        });
        error
    }
}

/// A fresh working set starts with one worked example.
fn seed_sections() -> Vec<Section> {
    vec![
        Section::new("Introduction")
            .with_content("- The problem is X\n- We propose Y\n- E = mc^2")
            .with_citations(vec!["Smith et al. 2020".to_string()]),
    ]
}
