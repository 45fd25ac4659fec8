//! Orchestrator - drives one submission through the UI state machine.
//!
//! ```text
//! Idle --submit--> Loading --resolve--> Success | Error
//!   ^                                      |
//!   +------------generate_another----------+   (or submit again)
//! ```

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::{validate_prompt, ClientError, GenerationResult, VideoClient};

use super::notify::{NotificationKind, NotificationQueue};
use super::progress::{ProgressAnimator, DEFAULT_RESET_DELAY, DEFAULT_TICK};
use super::state::{render, UiState, View, ViewState};

/// Default pause between a successful response and showing the result.
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_millis(500);

/// Timing knobs of the studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudioTiming {
    /// Pause at 100% before the result panel appears.
    pub success_delay: Duration,
    pub progress_tick: Duration,
    /// Delay before the progress bar returns to zero after resolution.
    pub progress_reset_delay: Duration,
}

impl Default for StudioTiming {
    fn default() -> Self {
        Self {
            success_delay: DEFAULT_SUCCESS_DELAY,
            progress_tick: DEFAULT_TICK,
            progress_reset_delay: DEFAULT_RESET_DELAY,
        }
    }
}

/// What happened to a submit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request is now in flight.
    Started,
    /// The prompt failed validation; nothing was sent.
    Rejected(String),
    /// The submit control is disabled; the action was ignored.
    Busy,
}

struct InFlight {
    task: JoinHandle<Result<GenerationResult, ClientError>>,
    cancel: CancellationToken,
    started: Instant,
}

/// A successful result waiting out the success delay before it is shown.
struct Completing {
    result: GenerationResult,
    show_at: tokio::time::Instant,
    elapsed: Duration,
}

/// Owns the view state and the single in-flight request.
///
/// A submission stays busy until [`resolve`](Self::resolve) has run to
/// completion. Dropping a `resolve` future early leaves the submission busy;
/// the next call picks up where the dropped one stopped.
pub struct Orchestrator {
    client: VideoClient,
    state: ViewState,
    progress: ProgressAnimator,
    timing: StudioTiming,
    in_flight: Option<InFlight>,
    completing: Option<Completing>,
}

impl Orchestrator {
    pub fn new(client: VideoClient) -> Self {
        Self::with_settings(client, StudioTiming::default(), NotificationQueue::default())
    }

    pub fn with_settings(client: VideoClient, timing: StudioTiming, notifications: NotificationQueue) -> Self {
        Self {
            client,
            state: ViewState::new(notifications),
            progress: ProgressAnimator::new(timing.progress_tick),
            timing,
            in_flight: None,
            completing: None,
        }
    }

    /// Replace the progress animator, e.g. with a seeded one.
    pub fn with_progress(mut self, progress: ProgressAnimator) -> Self {
        self.progress = progress;
        self
    }

    pub fn client(&self) -> &VideoClient {
        &self.client
    }

    pub fn timing(&self) -> StudioTiming {
        self.timing
    }

    /// The view state, with the progress value brought up to date.
    pub fn state(&mut self) -> &ViewState {
        self.sync_progress();
        &self.state
    }

    pub fn ui(&self) -> &UiState {
        &self.state.ui
    }

    /// Whether a submission is in flight or still waiting to be shown.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || self.completing.is_some()
    }

    /// Whether the in-flight request has finished, so `resolve` will not wait
    /// on the network.
    pub fn request_finished(&self) -> bool {
        match self.in_flight {
            Some(ref in_flight) => in_flight.task.is_finished(),
            None => self.completing.is_some(),
        }
    }

    pub fn progress(&self) -> &ProgressAnimator {
        &self.progress
    }

    /// Render the current frame.
    pub fn view(&mut self) -> View {
        self.sync_progress();
        self.state.notifications.tick(Instant::now());
        render(&self.state)
    }

    /// Post a notification.
    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.state.notifications.push(kind, message, Instant::now());
    }

    /// Handle a submit action.
    ///
    /// Must be called from within a tokio runtime when the prompt is valid.
    pub fn submit(&mut self, prompt: &str) -> SubmitOutcome {
        if !self.state.submit_enabled || self.is_busy() {
            log::debug!("Submit ignored: a request is already in flight");
            return SubmitOutcome::Busy;
        }

        if let Err(e) = validate_prompt(prompt) {
            let message = e.to_string();
            log::warn!("Prompt rejected: {}", message);
            self.notify(NotificationKind::Warning, message.clone());
            return SubmitOutcome::Rejected(message);
        }

        let prompt = prompt.trim().to_string();
        self.state.prompt = prompt.clone();
        self.state.ui = UiState::Loading;
        self.state.submit_enabled = false;
        self.progress.start();
        self.sync_progress();

        let cancel = CancellationToken::new();
        let client = self.client.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { client.generate_cancellable(&prompt, &token).await });

        log::info!("Generation started");
        self.in_flight = Some(InFlight {
            task,
            cancel,
            started: Instant::now(),
        });
        SubmitOutcome::Started
    }

    /// Abort the in-flight request, if any. Its resolution becomes an error.
    pub fn abort(&mut self) -> bool {
        match self.in_flight {
            Some(ref in_flight) => {
                log::info!("Aborting in-flight request");
                in_flight.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// A clone of the in-flight request's cancellation token, for signal handlers.
    pub fn cancel_token(&self) -> Option<CancellationToken> {
        self.in_flight.as_ref().map(|f| f.cancel.clone())
    }

    /// Wait for the in-flight request and apply its outcome.
    ///
    /// Returns immediately with the current state when nothing is in flight.
    /// Cancel-safe: the request handle is only released once it has finished,
    /// and a success waiting out the success delay is kept until shown.
    pub async fn resolve(&mut self) -> &UiState {
        if let Some(in_flight) = self.in_flight.as_mut() {
            let joined = (&mut in_flight.task).await;
            let elapsed = in_flight.started.elapsed();
            self.in_flight = None;
            self.progress.stop();

            let outcome = joined.unwrap_or_else(|join_error| {
                log::error!("Generation task failed: {}", join_error);
                Err(ClientError::Cancelled)
            });

            match outcome {
                Ok(result) => {
                    self.progress.complete();
                    self.sync_progress();
                    self.completing = Some(Completing {
                        result,
                        show_at: tokio::time::Instant::now() + self.timing.success_delay,
                        elapsed,
                    });
                }
                Err(e) => {
                    let message = e.user_message();
                    log::error!("Generation failed after {:.1}s: {}", elapsed.as_secs_f64(), e);
                    self.state.ui = UiState::Error(message.clone());
                    self.notify(NotificationKind::Error, message);
                    self.finish();
                }
            }
        }

        if let Some(show_at) = self.completing.as_ref().map(|c| c.show_at) {
            tokio::time::sleep_until(show_at).await;
            if let Some(completing) = self.completing.take() {
                log::info!(
                    "Generation completed in {:.1}s",
                    completing.elapsed.as_secs_f64()
                );
                self.state.ui = UiState::Success(completing.result);
                self.notify(NotificationKind::Success, "Video generated successfully!");
                self.finish();
            }
        }

        &self.state.ui
    }

    /// Re-enable submit and schedule the progress reset after a resolution.
    fn finish(&mut self) {
        self.state.submit_enabled = true;
        // Reset task is detached; a later start() invalidates it.
        let _ = self.progress.schedule_reset(self.timing.progress_reset_delay);
    }

    /// Return to the idle form after a submission resolved.
    pub fn generate_another(&mut self) -> bool {
        if self.is_busy() {
            log::debug!("Generate-another ignored while loading");
            return false;
        }
        self.state.ui = UiState::Idle;
        self.state.prompt.clear();
        true
    }

    fn sync_progress(&mut self) {
        self.state.progress = self.progress.value();
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            in_flight.task.abort();
        }
    }
}
