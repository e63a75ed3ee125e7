//! services/app/src/session/history.rs
//!
//! Read-only retrieval for the session history panel.

use study_core::domain::{SessionDetail, SessionSummary};
use study_core::ports::PortResult;
use tracing::error;

use crate::session::state::AppState;

/// Loads the list of past sessions. A retrieval failure degrades to an empty
/// panel; the error is logged, not surfaced.
pub async fn load_history(app: &AppState) -> Vec<SessionSummary> {
    match app.transport.list_history().await {
        Ok(sessions) => sessions,
        Err(e) => {
            error!("failed to load history: {}", e);
            Vec::new()
        }
    }
}

/// Fetches one stored session in full.
pub async fn open_session(app: &AppState, session_id: &str) -> PortResult<SessionDetail> {
    app.transport.fetch_session(session_id).await
}
