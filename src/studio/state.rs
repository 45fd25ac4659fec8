//! Explicit view state and the pure function that turns it into panels.

use crate::backend::GenerationResult;

use super::notify::{NotificationKind, NotificationQueue};
use super::render::ResultView;

/// Label of the submit control when idle.
pub const SUBMIT_LABEL: &str = "Generate Video";

/// Label of the submit control while a request is in flight.
pub const SUBMIT_LABEL_BUSY: &str = "Generating...";

/// Display mode of the studio. Exactly one is active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Success(GenerationResult),
    /// Message shown in the error panel.
    Error(String),
}

impl UiState {
    pub fn name(&self) -> &'static str {
        match self {
            UiState::Idle => "idle",
            UiState::Loading => "loading",
            UiState::Success(_) => "success",
            UiState::Error(_) => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    /// Whether the state ends a submission.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UiState::Success(_) | UiState::Error(_))
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match self {
            UiState::Success(result) => Some(result),
            _ => None,
        }
    }
}

/// Everything the renderer needs, in one place.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub ui: UiState,
    /// Prompt of the current or last submission.
    pub prompt: String,
    pub submit_enabled: bool,
    /// Progress bar fill, 0 to 100.
    pub progress: f64,
    pub notifications: NotificationQueue,
}

impl ViewState {
    pub fn new(notifications: NotificationQueue) -> Self {
        Self {
            ui: UiState::Idle,
            prompt: String::new(),
            submit_enabled: true,
            progress: 0.0,
            notifications,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(NotificationQueue::default())
    }
}

/// A rendered frame: which panels are visible and what they contain.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    /// Progress percentage when the loading panel is visible.
    pub loading: Option<f64>,
    pub result: Option<ResultView>,
    pub error: Option<String>,
    /// Offered after a submission resolves.
    pub generate_another: bool,
    /// Shown notifications, oldest first.
    pub notifications: Vec<(NotificationKind, String)>,
}

/// Derive the visible panels from the state.
pub fn render(state: &ViewState) -> View {
    let (loading, result, error) = match &state.ui {
        UiState::Idle => (None, None, None),
        UiState::Loading => (Some(state.progress.clamp(0.0, 100.0)), None, None),
        UiState::Success(result) => (None, Some(ResultView::from_result(result)), None),
        UiState::Error(message) => (None, None, Some(message.clone())),
    };

    View {
        submit_label: if state.submit_enabled {
            SUBMIT_LABEL
        } else {
            SUBMIT_LABEL_BUSY
        },
        submit_enabled: state.submit_enabled,
        loading,
        result,
        error,
        generate_another: state.ui.is_terminal(),
        notifications: state
            .notifications
            .visible()
            .map(|n| (n.kind, n.message.clone()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn result() -> GenerationResult {
        GenerationResult {
            video_data: "data:video/mp4;base64,AAAA".to_string(),
            original_prompt: "a cat".to_string(),
            enhanced_prompt: "a cat, cinematic lighting".to_string(),
            model_used: "model-x".to_string(),
            generation_timestamp: None,
            video_size_bytes: None,
        }
    }

    #[test]
    fn test_idle_renders_only_form() {
        let view = render(&ViewState::default());
        assert_eq!(view.submit_label, SUBMIT_LABEL);
        assert!(view.submit_enabled);
        assert!(view.loading.is_none());
        assert!(view.result.is_none());
        assert!(view.error.is_none());
        assert!(!view.generate_another);
    }

    #[test]
    fn test_loading_shows_progress_and_disables_submit() {
        let mut state = ViewState::default();
        state.ui = UiState::Loading;
        state.submit_enabled = false;
        state.progress = 42.0;

        let view = render(&state);
        assert_eq!(view.loading, Some(42.0));
        assert_eq!(view.submit_label, SUBMIT_LABEL_BUSY);
        assert!(!view.submit_enabled);
        assert!(view.result.is_none());
    }

    #[test]
    fn test_success_shows_result_panel_only() {
        let mut state = ViewState::default();
        state.ui = UiState::Success(result());

        let view = render(&state);
        let panel = view.result.unwrap();
        assert_eq!(panel.video_src, "data:video/mp4;base64,AAAA");
        assert_eq!(panel.original_prompt, "a cat");
        assert_eq!(panel.enhanced_prompt, "a cat, cinematic lighting");
        assert!(view.loading.is_none());
        assert!(view.error.is_none());
        assert!(view.generate_another);
    }

    #[test]
    fn test_error_shows_error_panel_only() {
        let mut state = ViewState::default();
        state.ui = UiState::Error("boom".to_string());

        let view = render(&state);
        assert_eq!(view.error.as_deref(), Some("boom"));
        assert!(view.result.is_none());
        assert!(view.generate_another);
    }

    #[test]
    fn test_only_shown_notifications_are_rendered() {
        let start = Instant::now();
        let mut state = ViewState::default();
        state
            .notifications
            .push(NotificationKind::Info, "first", start);
        state
            .notifications
            .push(NotificationKind::Error, "second", start + Duration::from_millis(150));
        state.notifications.tick(start + Duration::from_millis(200));

        let view = render(&state);
        assert_eq!(view.notifications, vec![(NotificationKind::Info, "first".to_string())]);
    }

    #[test]
    fn test_ui_state_helpers() {
        assert_eq!(UiState::Idle.name(), "idle");
        assert!(UiState::Loading.is_loading());
        assert!(UiState::Error(String::new()).is_terminal());
        assert!(UiState::Success(result()).result().is_some());
        assert!(UiState::Idle.result().is_none());
    }
}
