/// Failure reported by the remote session while listing or navigating.
/// Always fatal to the run; the engine performs no retry.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("element not found: {0}")]
    ElementNotFound(String),
    #[error("navigation blocked: {0}")]
    NavigationBlocked(String),
    #[error("remote session error: {0}")]
    Session(String),
}

/// Caller misuse of the run controls. Surfaced immediately, never
/// swallowed; a caller that respects the run lifecycle never sees these.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("run is already paused")]
    AlreadyPaused,
    #[error("run is not paused")]
    NotPaused,
    #[error("no run in progress")]
    NotRunning,
}

/// Why a traversal stopped before natural completion.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error(transparent)]
    Remote(#[from] ClientError),
    #[error("export sink error: {0}")]
    Export(#[source] anyhow::Error),
    /// Internal unwind signal raised at a safe point once cancellation is
    /// requested. Caught by the runner; never escapes to callers.
    #[error("run cancelled")]
    Cancelled,
}
