use super::publisher::{Preview, PreviewPublisher};
use super::section::{FormattedSection, Section};
use crate::llm::Completion;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Where the formatter currently is. `InFlight` drives the preview's busy
/// indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatterPhase {
    Idle,
    Debouncing,
    InFlight,
}

/// The section-to-prose pipeline.
///
/// Every edit to the working set queues a by-value snapshot. A fixed quiet
/// window (restarted by each edit) must elapse before a formatting cycle
/// starts; the cycle snapshots the whole list, issues one concurrent backend
/// call per non-empty section, and publishes the assembled result
/// all-or-nothing once every call has resolved. Edits that land while a cycle
/// is in flight never cancel it; they trigger an immediate follow-up cycle
/// after it settles. Publication is sequence-guarded so a stale cycle can
/// never overwrite a newer one.
pub struct SectionFormatter {
    edits: mpsc::UnboundedSender<Vec<Section>>,
    publisher: Arc<PreviewPublisher>,
    phase: watch::Receiver<FormatterPhase>,
    driver: JoinHandle<()>,
}

impl SectionFormatter {
    /// Spawn the drive task. `debounce` is the quiet window after the last
    /// edit before a cycle starts.
    pub fn spawn(client: Arc<dyn Completion>, debounce: Duration) -> Self {
        let publisher = Arc::new(PreviewPublisher::new());
        let (edit_tx, edit_rx) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(FormatterPhase::Idle);
        let driver = tokio::spawn(drive(
            edit_rx,
            client,
            Arc::clone(&publisher),
            phase_tx,
            debounce,
        ));
        Self {
            edits: edit_tx,
            publisher,
            phase: phase_rx,
            driver,
        }
    }

    /// Queue a fresh by-value snapshot of the working set, (re)starting the
    /// debounce window.
    pub fn notify_edit(&self, sections: &[Section]) {
        let _ = self.edits.send(sections.to_vec());
    }

    /// The most recent published preview.
    pub fn preview(&self) -> Arc<Preview> {
        self.publisher.load()
    }

    /// Change notification for publications; the value is the cycle number.
    pub fn subscribe_preview(&self) -> watch::Receiver<u64> {
        self.publisher.subscribe()
    }

    pub fn phase(&self) -> FormatterPhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<FormatterPhase> {
        self.phase.clone()
    }
}

impl Drop for SectionFormatter {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(
    mut edits: mpsc::UnboundedReceiver<Vec<Section>>,
    client: Arc<dyn Completion>,
    publisher: Arc<PreviewPublisher>,
    phase: watch::Sender<FormatterPhase>,
    debounce: Duration,
) {
    let mut cycle = 0u64;
    while let Some(mut latest) = edits.recv().await {
        let _ = phase.send(FormatterPhase::Debouncing);
        // Each further edit restarts the quiet window.
        loop {
            match tokio::time::timeout(debounce, edits.recv()).await {
                Ok(Some(snapshot)) => latest = snapshot,
                Ok(None) => return,
                Err(_) => break,
            }
        }
        // Run cycles back to back until no edits arrived mid-flight. The
        // in-flight cycle's input is stale the moment an edit lands, but its
        // output still publishes first; the follow-up supersedes it.
        loop {
            cycle += 1;
            let _ = phase.send(FormatterPhase::InFlight);
            let formatted = run_cycle(client.as_ref(), &latest).await;
            publisher.publish(cycle, formatted);

            let mut dirty = false;
            while let Ok(snapshot) = edits.try_recv() {
                latest = snapshot;
                dirty = true;
            }
            if !dirty {
                break;
            }
        }
        let _ = phase.send(FormatterPhase::Idle);
    }
}

/// Format one snapshot: one concurrent backend call per section with notes,
/// an immediate empty result for the rest, assembled in snapshot order.
async fn run_cycle(client: &dyn Completion, snapshot: &[Section]) -> Vec<FormattedSection> {
    let calls = snapshot.iter().map(|section| async move {
        if !section.has_notes() {
            return FormattedSection {
                section_id: section.id.clone(),
                title: section.title.clone(),
                content: String::new(),
            };
        }
        let content = match client
            .format(&section.title, &section.content, &section.citations)
            .await
        {
            Ok(prose) => prose,
            Err(error) => {
                tracing::warn!(section = %section.id, %error, "formatting fell back to raw notes");
                error.into_fallback()
            }
        };
        FormattedSection {
            section_id: section.id.clone(),
            title: section.title.clone(),
            content,
        }
    });
    join_all(calls).await
}
