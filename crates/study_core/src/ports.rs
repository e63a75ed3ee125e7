//! crates/study_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of whether the backend is real or mocked.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ContentType, QuizQuestion, SessionDetail, SessionSummary};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the external backend; any
/// non-success outcome is reported uniformly, without per-status branching.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Transport Request/Response Records
//=========================================================================================

/// The backend's acknowledgement of a processed document.
#[derive(Debug, Clone)]
pub struct DocumentIngest {
    pub content_id: String,
    pub display_name: String,
    pub status: String,
    pub page_count: u32,
}

/// The backend's acknowledgement of a processed video.
#[derive(Debug, Clone)]
pub struct VideoIngest {
    pub content_id: String,
    pub title: String,
    pub url: String,
    pub duration: String,
    pub status: String,
}

/// One outgoing chat turn. `content_id` is absent only when the active
/// transport does not require a context (see [`TransportService::requires_context`]).
#[derive(Debug, Clone)]
pub struct ChatTurnRequest {
    pub message: String,
    pub content_id: Option<String>,
    pub content_type: ContentType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ChatTurnReply {
    pub reply: String,
    pub timestamp: DateTime<Utc>,
}

/// One graded answer, as persisted with the quiz result.
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub selected_option_index: usize,
}

/// A completed quiz attempt, persisted fire-and-forget after grading.
#[derive(Debug, Clone)]
pub struct QuizResultRecord {
    pub content_type: ContentType,
    pub answers: Vec<AnswerRecord>,
    pub correct_count: usize,
    pub total_questions: usize,
    pub timestamp: DateTime<Utc>,
}

//=========================================================================================
// Service Port (Trait)
//=========================================================================================

/// The transport capability consumed by the interaction core. Implemented by
/// the live HTTP backend adapter and by the mock generator; selected once at
/// startup, never branched on at call sites.
#[async_trait]
pub trait TransportService: Send + Sync {
    // --- Ingestion ---
    async fn ingest_document(&self, file_name: &str, payload: &[u8]) -> PortResult<DocumentIngest>;

    async fn ingest_video(&self, url: &str) -> PortResult<VideoIngest>;

    // --- Chat ---
    async fn send_chat_turn(&self, request: ChatTurnRequest) -> PortResult<ChatTurnReply>;

    // --- Quiz ---
    async fn generate_quiz(
        &self,
        content_id: &str,
        content_type: ContentType,
        question_count: usize,
    ) -> PortResult<Vec<QuizQuestion>>;

    async fn persist_quiz_result(&self, record: QuizResultRecord) -> PortResult<()>;

    // --- History ---
    async fn list_history(&self) -> PortResult<Vec<SessionSummary>>;

    async fn fetch_session(&self, session_id: &str) -> PortResult<SessionDetail>;

    /// Whether chatting requires a previously ingested context. The live
    /// backend refuses context-less questions; the mock answers regardless.
    fn requires_context(&self) -> bool {
        true
    }
}
