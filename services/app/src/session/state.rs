//! services/app/src/session/state.rs
//!
//! Defines the application's shared and per-panel states.

use crate::config::Config;
use crate::session::chat::ChatTranscript;
use crate::session::controller::default_greeting;
use crate::session::quiz::QuizPanel;
use std::sync::Arc;
use study_core::domain::{ContentContext, ContentType};
use study_core::ports::TransportService;

//=========================================================================================
// AppState (Shared Across Both Panels)
//=========================================================================================

/// The shared application state, created once at startup and passed to all
/// session operations.
#[derive(Clone)]
pub struct AppState {
    pub transport: Arc<dyn TransportService>,
    pub config: Arc<Config>,
}

//=========================================================================================
// PanelState (One Per Content Type)
//=========================================================================================

/// The ingestion state machine of a panel:
/// `Empty → Ingesting → Ready → Empty` (reset) or `Ingesting → Empty` (failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    /// The upload surface is showing; no content is loaded.
    Empty,
    /// An ingestion request is in flight; the trigger is disabled.
    Ingesting,
    /// Content is loaded and the viewer is showing.
    Ready,
}

/// The complete state of one content panel. The `pdf` and `video` panels are
/// two independent instances of this struct; they never share context,
/// transcript, or quiz state.
pub struct PanelState {
    pub content_type: ContentType,
    pub phase: ViewPhase,
    pub context: Option<ContentContext>,
    /// The user's current source selection (file name or URL), kept so a
    /// failed ingestion can be retried without re-picking.
    pub selected_source: Option<String>,
    /// What the embedded viewer shows: the PDF file name or the video embed URL.
    pub viewer_target: Option<String>,
    pub transcript: ChatTranscript,
    pub quiz: QuizPanel,
}

impl PanelState {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            phase: ViewPhase::Empty,
            context: None,
            selected_source: None,
            viewer_target: None,
            transcript: ChatTranscript::new(default_greeting(content_type)),
            quiz: QuizPanel::new(),
        }
    }
}
