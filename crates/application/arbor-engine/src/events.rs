use uuid::Uuid;

/// Notifications delivered to the run observer.
///
/// Events arrive in the exact order the worker performed the underlying
/// mutations; `Progress` is sent once per counter change. Observers are
/// free to coalesce, the channel never drops.
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    Started {
        run_id: Uuid,
    },
    /// One per counter mutation, carrying the fresh values.
    Progress {
        queued: u64,
        read: u64,
    },
    EnteredFolder {
        path: Vec<String>,
    },
    LeftFolder {
        path: Vec<String>,
    },
    Paused,
    Resumed,
    /// Terminal: the whole tree was walked and the export flushed.
    Completed {
        read: u64,
    },
    /// Terminal: the run was cancelled and has fully unwound.
    Cancelled,
    /// Terminal: a remote or export failure ended the run.
    Failed {
        message: String,
    },
}

impl CrawlEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Cancelled | Self::Failed { .. }
        )
    }
}
