use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::UnboundedSender;

use crate::events::CrawlEvent;

/// Work counters for one run: leaves discovered but not yet emitted
/// (`queued`) and leaves already emitted (`read`).
///
/// Written only by the worker thread; readable from any thread at any
/// time. Reads are plain atomic loads, fresh but unsynchronized with
/// each other.
#[derive(Debug, Default)]
pub struct Progress {
    queued: AtomicU64,
    read: AtomicU64,
}

impl Progress {
    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn read(&self) -> u64 {
        self.read.load(Ordering::Relaxed)
    }

    /// Fraction of known work already emitted. Zero while nothing has
    /// been discovered, rather than a division by zero.
    pub fn ratio(&self) -> f64 {
        let read = self.read();
        let total = self.queued() + read;
        if total == 0 {
            0.0
        } else {
            read as f64 / total as f64
        }
    }
}

/// Worker-side handle pairing the counters with the observer channel, so
/// every mutation produces exactly one notification.
pub(crate) struct ProgressChannel<'a> {
    counters: &'a Progress,
    events: &'a UnboundedSender<CrawlEvent>,
}

impl<'a> ProgressChannel<'a> {
    pub(crate) fn new(counters: &'a Progress, events: &'a UnboundedSender<CrawlEvent>) -> Self {
        Self { counters, events }
    }

    /// Record a whole listing's worth of discovered leaves in one step,
    /// so the counter reflects known work before any of it is emitted.
    pub(crate) fn enqueue(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.counters.queued.fetch_add(count, Ordering::Relaxed);
        self.notify();
    }

    /// A queued leaf is about to be emitted.
    pub(crate) fn take(&self) {
        self.counters.queued.fetch_sub(1, Ordering::Relaxed);
        self.notify();
    }

    /// A leaf was handed to the sink.
    pub(crate) fn complete(&self) {
        self.counters.read.fetch_add(1, Ordering::Relaxed);
        self.notify();
    }

    fn notify(&self) {
        // The observer may already be gone; counters stay correct either way.
        let _ = self.events.send(CrawlEvent::Progress {
            queued: self.counters.queued(),
            read: self.counters.read(),
        });
    }
}
