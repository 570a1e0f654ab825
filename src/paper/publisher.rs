use super::section::FormattedSection;
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Output of one settled formatting cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    /// Sequence number of the cycle that produced this output.
    pub cycle: u64,
    pub sections: Vec<FormattedSection>,
}

/// Publication point for settled cycles.
///
/// Cycles may settle out of order relative to when they were issued; only a
/// cycle with a sequence number strictly greater than the last published one
/// may replace the preview. A superseded cycle that settles late is discarded
/// here, at publication time, never cancelled at request time.
pub struct PreviewPublisher {
    current: ArcSwap<Preview>,
    gate: Mutex<u64>,
    notify: watch::Sender<u64>,
}

impl PreviewPublisher {
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            current: ArcSwap::from_pointee(Preview::default()),
            gate: Mutex::new(0),
            notify,
        }
    }

    /// Atomically replace the preview with a settled cycle's output.
    ///
    /// Returns `false` when a newer cycle already owns the preview, in which
    /// case the output is dropped.
    pub fn publish(&self, cycle: u64, sections: Vec<FormattedSection>) -> bool {
        let mut highest = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if cycle <= *highest {
            tracing::debug!(cycle, highest = *highest, "discarding superseded formatting cycle");
            return false;
        }
        *highest = cycle;
        self.current.store(Arc::new(Preview { cycle, sections }));
        let _ = self.notify.send(cycle);
        true
    }

    /// The most recent published preview.
    pub fn load(&self) -> Arc<Preview> {
        self.current.load_full()
    }

    /// Change notification: the watched value is the published cycle number.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }
}
