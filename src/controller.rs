//! Workflow controller: the single owner of the page-lifetime workflow state.
//!
//! The state is a [`WorkflowState`] value published through a
//! `tokio::sync::watch` channel. Every transition replaces the whole value in
//! one synchronous step, so subscribers never observe a half-applied
//! transition. Display code subscribes and re-renders from the latest value.
//!
//! ## Per-submission lifecycle
//!
//! ```text
//!            start_conversion()            complete_conversion(result)
//!   Idle ───────────────────────▶ Submitting ───────────────────────▶ Settled
//!                                    ▲                                   │
//!                                    └───────── start_conversion() ──────┘
//! ```
//!
//! A `start_conversion()` while `Submitting` is rejected with
//! [`Web2MdError::Busy`]; the in-flight submission is left untouched.
//! `select_mode()` is allowed in every phase and never touches `is_loading`
//! or `last_result`.

use crate::error::Web2MdError;
use crate::mode::ConversionMode;
use crate::result::ConversionResult;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

/// Identifier of one accepted submission, counting from 1.
pub type SubmissionId = u64;

/// Where the workflow is in the current submission's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Settled,
}

/// Snapshot of the workflow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowState {
    /// Which form is displayed.
    pub selected_mode: ConversionMode,
    pub is_loading: bool,
    /// Outcome of the most recent settled submission; cleared on start.
    pub last_result: Option<ConversionResult>,
    /// Mode of the submission currently in flight.
    pub in_flight_mode: Option<ConversionMode>,
    /// Accepted `start_conversion` calls.
    pub submissions: u64,
    /// `complete_conversion` calls.
    pub completions: u64,
}

impl WorkflowState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Submitting
        } else if self.last_result.is_some() {
            Phase::Settled
        } else {
            Phase::Idle
        }
    }

    /// Busy copy for the selected mode while a job is in flight.
    pub fn progress_message(&self) -> Option<&'static str> {
        self.is_loading
            .then(|| self.selected_mode.progress_message())
    }
}

/// Owns the [`WorkflowState`] and exposes its transitions.
#[derive(Debug)]
pub struct WorkflowController {
    state: watch::Sender<WorkflowState>,
}

impl Default for WorkflowController {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowController {
    /// `selected_mode = webpage`, not loading, no result.
    pub fn new() -> Self {
        let (state, _) = watch::channel(WorkflowState::default());
        Self { state }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn selected_mode(&self) -> ConversionMode {
        self.state.borrow().selected_mode
    }

    /// Receiver that observes every subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    /// Stream of states, starting with the current one.
    pub fn updates(&self) -> WatchStream<WorkflowState> {
        WatchStream::new(self.subscribe())
    }

    /// Switch the displayed form. Does not cancel or alter an in-flight job.
    pub fn select_mode(&self, mode: ConversionMode) {
        self.state.send_if_modified(|s| {
            if s.selected_mode == mode {
                return false;
            }
            debug!("Mode {} → {}", s.selected_mode, mode);
            s.selected_mode = mode;
            true
        });
    }

    /// Enter `Submitting` for a job of `mode`: set loading and clear the last result.
    ///
    /// # Errors
    /// [`Web2MdError::Busy`] when a submission is already in flight.
    pub fn start_conversion(&self, mode: ConversionMode) -> Result<SubmissionId, Web2MdError> {
        let mut outcome = Err(Web2MdError::Busy { mode });
        self.state.send_if_modified(|s| {
            if s.is_loading {
                let busy = s.in_flight_mode.unwrap_or(mode);
                warn!("Rejected {} submission: {} already in flight", mode, busy);
                outcome = Err(Web2MdError::Busy { mode: busy });
                return false;
            }
            s.is_loading = true;
            s.last_result = None;
            s.in_flight_mode = Some(mode);
            s.submissions += 1;
            outcome = Ok(s.submissions);
            true
        });
        if let Ok(id) = outcome {
            info!("Submission #{} started ({})", id, mode);
        }
        outcome
    }

    /// Settle the current submission with `result`.
    ///
    /// Always applies. Calling it with nothing in flight is logged as a caller bug.
    pub fn complete_conversion(&self, result: ConversionResult) {
        self.state.send_modify(|s| {
            if !s.is_loading {
                warn!("complete_conversion called with no submission in flight");
            }
            info!(
                "Submission #{} settled: {}",
                s.submissions,
                if result.is_success() { "success" } else { "failure" }
            );
            s.is_loading = false;
            s.in_flight_mode = None;
            s.last_result = Some(result);
            s.completions += 1;
        });
    }
}
