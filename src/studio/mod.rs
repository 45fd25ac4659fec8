//! The interactive studio: request lifecycle, progress, notifications,
//! result rendering and saving.
//!
//! All page state lives in one [`ViewState`] owned by the [`Orchestrator`];
//! [`render`] turns it into the panels a front end draws.

mod download;
mod notify;
mod orchestrator;
mod progress;
mod render;
mod state;

pub use download::{download_filename, DownloadError, DownloadHelper, VideoSource, FILENAME_PREFIX};
pub use notify::{
    Notification, NotificationKind, NotificationPhase, NotificationQueue, NotificationTiming,
};
pub use orchestrator::{Orchestrator, StudioTiming, SubmitOutcome, DEFAULT_SUCCESS_DELAY};
pub use progress::{ProgressAnimator, DEFAULT_RESET_DELAY, DEFAULT_TICK};
pub use render::{draw, format_size, progress_bar, write_result, ResultView};
pub use state::{render, UiState, View, ViewState, SUBMIT_LABEL, SUBMIT_LABEL_BUSY};
