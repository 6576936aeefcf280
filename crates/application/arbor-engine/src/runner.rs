use std::sync::Arc;
use std::thread;

use anyhow::Context;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::control::{RunControl, RunPhase};
use crate::error::{ControlError, CrawlError};
use crate::events::CrawlEvent;
use crate::ports::{ExportSink, RemoteTreeClient};
use crate::progress::{Progress, ProgressChannel};
use crate::walker::Walker;

/// Everything needed to start one run.
#[derive(Debug, Clone, Default)]
pub struct CrawlRequest {
    /// Folder names from the tree root down to the folder traversal
    /// starts in. Empty means the root itself.
    pub start_path: Vec<String>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { read: u64 },
    Cancelled,
    Failed { message: String },
}

/// Controller side of a running crawl.
///
/// The crawl itself runs start-to-finish on its own named worker thread;
/// this handle is how any other thread pauses, resumes, cancels and
/// observes it.
pub struct CrawlHandle {
    run_id: Uuid,
    control: Arc<RunControl>,
    progress: Arc<Progress>,
    events: UnboundedSender<CrawlEvent>,
    worker: Option<thread::JoinHandle<RunOutcome>>,
}

impl CrawlHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.control.phase()
    }

    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.control.is_cancel_requested()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Block until the worker is parked at a safe point; until `resume`
    /// it will issue no further remote calls.
    pub fn pause(&self) -> Result<(), ControlError> {
        self.control.pause()?;
        let _ = self.events.send(CrawlEvent::Paused);
        Ok(())
    }

    pub fn resume(&self) -> Result<(), ControlError> {
        self.control.resume()?;
        let _ = self.events.send(CrawlEvent::Resumed);
        Ok(())
    }

    /// Request cancellation and block until the worker has unwound and
    /// the remote session is torn down. May wait out one in-flight
    /// remote call; there is no timeout on that wait.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Wait for the worker to exit and collect how the run ended.
    pub fn join(mut self) -> RunOutcome {
        match self.worker.take() {
            Some(worker) => worker.join().unwrap_or_else(|_| RunOutcome::Failed {
                message: "crawl worker panicked".to_string(),
            }),
            None => RunOutcome::Failed {
                message: "crawl worker was never attached".to_string(),
            },
        }
    }
}

/// Start a crawl on a dedicated worker thread and hand back its controls.
pub fn spawn<C, S>(
    client: C,
    sink: S,
    request: CrawlRequest,
    events: UnboundedSender<CrawlEvent>,
) -> anyhow::Result<CrawlHandle>
where
    C: RemoteTreeClient + 'static,
    S: ExportSink + 'static,
{
    let run_id = Uuid::new_v4();
    let control = Arc::new(RunControl::new());
    let progress = Arc::new(Progress::default());

    let worker = {
        let control = control.clone();
        let progress = progress.clone();
        let events = events.clone();
        let mut client = client;
        let mut sink = sink;
        thread::Builder::new()
            .name("arbor-crawl".into())
            .spawn(move || {
                run_crawl(
                    &mut client,
                    &mut sink,
                    &request,
                    run_id,
                    &control,
                    &progress,
                    &events,
                )
            })
            .context("Failed to spawn crawl worker thread")?
    };

    Ok(CrawlHandle {
        run_id,
        control,
        progress,
        events,
        worker: Some(worker),
    })
}

fn run_crawl(
    client: &mut dyn RemoteTreeClient,
    sink: &mut dyn ExportSink,
    request: &CrawlRequest,
    run_id: Uuid,
    control: &RunControl,
    progress: &Progress,
    events: &UnboundedSender<CrawlEvent>,
) -> RunOutcome {
    if control.begin().is_err() {
        // Cancelled before the run could start; nothing was navigated.
        debug!(run_id = %run_id, "run cancelled before start");
        client.shutdown();
        control.finish();
        let _ = events.send(CrawlEvent::Cancelled);
        return RunOutcome::Cancelled;
    }

    info!(run_id = %run_id, start = ?request.start_path, "crawl started");
    let _ = events.send(CrawlEvent::Started { run_id });

    let result = navigate_and_walk(client, sink, request, control, progress, events);

    let outcome = match result {
        Ok(()) => match sink.finish() {
            Ok(()) => {
                info!(read = progress.read(), "crawl completed");
                RunOutcome::Completed {
                    read: progress.read(),
                }
            }
            Err(e) => {
                error!(error = %e, "export flush failed");
                RunOutcome::Failed {
                    message: format!("export sink error: {e}"),
                }
            }
        },
        Err(CrawlError::Cancelled) => {
            // A cancelled run still keeps whatever it exported so far.
            if let Err(e) = sink.finish() {
                error!(error = %e, "export flush failed after cancellation");
            }
            info!(read = progress.read(), "crawl cancelled");
            RunOutcome::Cancelled
        }
        Err(e) => {
            error!(error = %e, "crawl failed");
            RunOutcome::Failed {
                message: e.to_string(),
            }
        }
    };

    client.shutdown();
    control.finish();

    let _ = events.send(match &outcome {
        RunOutcome::Completed { read } => CrawlEvent::Completed { read: *read },
        RunOutcome::Cancelled => CrawlEvent::Cancelled,
        RunOutcome::Failed { message } => CrawlEvent::Failed {
            message: message.clone(),
        },
    });

    outcome
}

fn navigate_and_walk(
    client: &mut dyn RemoteTreeClient,
    sink: &mut dyn ExportSink,
    request: &CrawlRequest,
    control: &RunControl,
    progress: &Progress,
    events: &UnboundedSender<CrawlEvent>,
) -> Result<(), CrawlError> {
    for segment in &request.start_path {
        client.enter_folder(segment)?;
    }

    let channel = ProgressChannel::new(progress, events);
    Walker::new(
        client,
        sink,
        control,
        channel,
        events,
        request.start_path.clone(),
    )
    .run()
}
