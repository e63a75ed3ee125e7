//! services/app/src/session/mod.rs
//!
//! The interaction core: per-content-type view state, chat transcript
//! discipline, and the quiz lifecycle.

pub mod chat;
pub mod controller;
pub mod history;
pub mod quiz;
pub mod state;

pub use chat::{send_chat_message, ChatTranscript, PlaceholderId, TranscriptEntry};
pub use controller::{ingest_source, reset, SourceDescriptor};
pub use quiz::{submit_quiz, toggle_quiz, QuizPanel, QuizPhase, QuizToggle};
pub use state::{AppState, PanelState, ViewPhase};
