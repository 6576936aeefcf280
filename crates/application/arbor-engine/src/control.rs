use std::sync::{Condvar, Mutex};

use crate::error::{ControlError, CrawlError};

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Paused,
    Cancelling,
    Finished,
}

#[derive(Debug)]
struct ControlState {
    phase: RunPhase,
    pause_requested: bool,
    cancel_requested: bool,
}

/// Coordination point between the worker thread and the controlling thread.
///
/// Pausing is a phase the worker enters at its next safe point rather than
/// a lock the controller holds, and cancellation is a phase transition the
/// worker acknowledges only once its recursion has fully unwound and the
/// remote session is torn down. The worker is the sole writer of that
/// acknowledgement.
#[derive(Debug)]
pub struct RunControl {
    state: Mutex<ControlState>,
    signal: Condvar,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ControlState {
                phase: RunPhase::Idle,
                pause_requested: false,
                cancel_requested: false,
            }),
            signal: Condvar::new(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.state.lock().unwrap().phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase() == RunPhase::Paused
    }

    /// True only between a `cancel()` request and the worker's
    /// unwind acknowledgement.
    pub fn is_cancel_requested(&self) -> bool {
        self.state.lock().unwrap().cancel_requested
    }

    /// Block the calling thread until the worker has parked at a safe
    /// point. Once this returns, the worker issues no further remote
    /// calls until `resume()`.
    pub fn pause(&self) -> Result<(), ControlError> {
        let mut state = self.state.lock().unwrap();
        match state.phase {
            RunPhase::Paused => return Err(ControlError::AlreadyPaused),
            RunPhase::Running if state.pause_requested => return Err(ControlError::AlreadyPaused),
            RunPhase::Running => state.pause_requested = true,
            _ => return Err(ControlError::NotRunning),
        }
        loop {
            match state.phase {
                RunPhase::Paused => return Ok(()),
                RunPhase::Cancelling | RunPhase::Finished => {
                    // The run ended before reaching a safe point.
                    state.pause_requested = false;
                    return Err(ControlError::NotRunning);
                }
                _ => state = self.signal.wait(state).unwrap(),
            }
        }
    }

    /// Release a paused worker. It unparks at its own discretion.
    pub fn resume(&self) -> Result<(), ControlError> {
        let mut state = self.state.lock().unwrap();
        if state.phase != RunPhase::Paused {
            return Err(ControlError::NotPaused);
        }
        state.phase = RunPhase::Running;
        self.signal.notify_all();
        Ok(())
    }

    /// Request cancellation and block until the worker has unwound and
    /// torn the remote session down. The worker only notices at a safe
    /// point, so this may block for the duration of an in-flight remote
    /// call; there is no timeout on that wait.
    ///
    /// Safe to call before a run was ever attached; that is a no-op
    /// beyond marking the control finished.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        match state.phase {
            RunPhase::Idle => {
                // No worker to wait for and no session to tear down.
                state.phase = RunPhase::Finished;
                self.signal.notify_all();
                return;
            }
            RunPhase::Finished => return,
            RunPhase::Running | RunPhase::Paused => {
                state.cancel_requested = true;
                state.pause_requested = false;
                state.phase = RunPhase::Cancelling;
                self.signal.notify_all();
            }
            RunPhase::Cancelling => {}
        }
        while state.phase != RunPhase::Finished {
            state = self.signal.wait(state).unwrap();
        }
    }

    /// Idle -> Running. Refused when the run was cancelled before it
    /// could start.
    pub(crate) fn begin(&self) -> Result<(), CrawlError> {
        let mut state = self.state.lock().unwrap();
        if state.phase == RunPhase::Idle {
            state.phase = RunPhase::Running;
            Ok(())
        } else {
            Err(CrawlError::Cancelled)
        }
    }

    /// Safe point. The worker parks here while paused and aborts here
    /// once cancellation is requested; called between emitting a
    /// listing's leaves and entering or leaving a child folder.
    pub(crate) fn checkpoint(&self) -> Result<(), CrawlError> {
        let mut state = self.state.lock().unwrap();
        loop {
            match state.phase {
                RunPhase::Cancelling => return Err(CrawlError::Cancelled),
                RunPhase::Running if state.pause_requested => {
                    state.pause_requested = false;
                    state.phase = RunPhase::Paused;
                    self.signal.notify_all();
                    while state.phase == RunPhase::Paused {
                        state = self.signal.wait(state).unwrap();
                    }
                    // Re-evaluate: resume() moved us back to Running,
                    // cancel() moved us to Cancelling.
                }
                RunPhase::Running => return Ok(()),
                _ => return Err(CrawlError::Cancelled),
            }
        }
    }

    /// Worker acknowledgement that the run is over and the session gone.
    /// Resets the cancellation request so the control reads as quiescent.
    pub(crate) fn finish(&self) {
        let mut state = self.state.lock().unwrap();
        state.phase = RunPhase::Finished;
        state.cancel_requested = false;
        state.pause_requested = false;
        self.signal.notify_all();
    }
}
