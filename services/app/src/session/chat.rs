//! services/app/src/session/chat.rs
//!
//! The chat engine: an append-only transcript with a transient "typing"
//! placeholder per in-flight send, and a two-phase clear.
//!
//! Each send inserts the user turn followed by a placeholder that holds the
//! AI turn's position until the reply resolves, so transcript order reflects
//! request order even when multiple sends race.

use chrono::Utc;
use std::sync::Arc;
use study_core::domain::{Speaker, Turn};
use study_core::ports::ChatTurnRequest;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::session::state::{AppState, PanelState};

/// Fixed refusal shown when the live backend is asked a question with no
/// content loaded. No network call is made in that case.
pub const NO_CONTEXT_REPLY: &str = "Please load a document before asking questions.";

/// Generic apology shown when a chat turn fails in transit. No raw error
/// detail reaches the transcript.
pub const CHAT_ERROR_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// Opaque identifier for one in-flight send's typing placeholder. A
/// placeholder is removed only by exact match, so racing sends cannot steal
/// each other's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderId(Uuid);

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    /// A settled turn; never mutated after creation.
    Message(Turn),
    /// The transient "typing" indicator. Never survives into a settled
    /// transcript.
    Typing(PlaceholderId),
}

/// The ordered chat transcript of one panel. Grows by append only; a reset
/// replaces it wholesale with a single synthetic greeting turn, so it is
/// never empty.
#[derive(Debug)]
pub struct ChatTranscript {
    entries: Vec<TranscriptEntry>,
    clear_pending: bool,
}

impl ChatTranscript {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            entries: vec![TranscriptEntry::Message(Turn::ai(greeting))],
            clear_pending: false,
        }
    }

    /// Replaces the transcript wholesale with a single AI greeting. Any
    /// typing placeholders are dropped; their late replies will no-op.
    pub fn reseed(&mut self, greeting: impl Into<String>) {
        self.entries.clear();
        self.entries.push(TranscriptEntry::Message(Turn::ai(greeting)));
        self.clear_pending = false;
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// The settled turns, in display order, skipping typing placeholders.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.entries.iter().filter_map(|entry| match entry {
            TranscriptEntry::Message(turn) => Some(turn),
            TranscriptEntry::Typing(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends the user's turn plus a typing placeholder reserving the
    /// reply's position. Whitespace-only input is a silent no-op.
    pub fn begin_send(&mut self, text: &str) -> Option<PlaceholderId> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }
        let id = PlaceholderId(Uuid::new_v4());
        self.entries.push(TranscriptEntry::Message(Turn::user(message)));
        self.entries.push(TranscriptEntry::Typing(id));
        Some(id)
    }

    /// Replaces the exact-matching placeholder, in position, with the AI
    /// turn. An unknown id is a no-op (the transcript may have been reseeded
    /// while the reply was in flight).
    pub fn resolve_reply(&mut self, id: PlaceholderId, text: impl Into<String>) {
        let slot = self
            .entries
            .iter_mut()
            .find(|entry| matches!(entry, TranscriptEntry::Typing(p) if *p == id));
        if let Some(slot) = slot {
            *slot = TranscriptEntry::Message(Turn {
                speaker: Speaker::Ai,
                text: text.into(),
                rendered_at: Utc::now(),
            });
        }
    }

    // --- Two-phase clear: request → confirm/cancel ---

    pub fn request_clear(&mut self) {
        self.clear_pending = true;
    }

    pub fn cancel_clear(&mut self) {
        self.clear_pending = false;
    }

    pub fn clear_pending(&self) -> bool {
        self.clear_pending
    }

    /// Confirms a previously requested clear, reseeding the transcript with a
    /// greeting that names the loaded content when there is one. Returns
    /// `false` and leaves the transcript untouched when no clear was pending.
    pub fn confirm_clear(&mut self, display_name: Option<&str>) -> bool {
        if !self.clear_pending {
            return false;
        }
        let greeting = match display_name {
            Some(name) => format!("Chat cleared. You can keep asking about \"{}\".", name),
            None => "Chat cleared. Load a document to get started.".to_string(),
        };
        self.reseed(greeting);
        true
    }
}

/// Drives one chat send end to end: append the user turn and placeholder,
/// resolve the reply through the transport, and settle the placeholder. Every
/// outcome (reply, refusal, failure) lands in the transcript; nothing is
/// surfaced as an error to the caller.
pub async fn send_chat_message(app: Arc<AppState>, panel_lock: Arc<Mutex<PanelState>>, text: &str) {
    let (placeholder, request) = {
        let mut panel = panel_lock.lock().await;
        let Some(placeholder) = panel.transcript.begin_send(text) else {
            return;
        };
        let request = ChatTurnRequest {
            message: text.trim().to_string(),
            content_id: panel.context.as_ref().map(|c| c.id.clone()),
            content_type: panel.content_type,
            timestamp: Utc::now(),
        };
        (placeholder, request)
    };

    // The live backend refuses context-less questions without a network call.
    if request.content_id.is_none() && app.transport.requires_context() {
        let mut panel = panel_lock.lock().await;
        panel.transcript.resolve_reply(placeholder, NO_CONTEXT_REPLY);
        return;
    }

    match app.transport.send_chat_turn(request).await {
        Ok(reply) => {
            let mut panel = panel_lock.lock().await;
            panel.transcript.resolve_reply(placeholder, reply.reply);
        }
        Err(e) => {
            warn!("chat turn failed: {}", e);
            let mut panel = panel_lock.lock().await;
            panel.transcript.resolve_reply(placeholder, CHAT_ERROR_REPLY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(transcript: &ChatTranscript) -> Vec<String> {
        transcript.turns().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn starts_with_exactly_one_greeting() {
        let transcript = ChatTranscript::new("hello there");
        assert_eq!(transcript.len(), 1);
        let first = transcript.turns().next().unwrap();
        assert_eq!(first.speaker, Speaker::Ai);
        assert_eq!(first.text, "hello there");
    }

    #[test]
    fn whitespace_only_send_is_a_silent_noop() {
        let mut transcript = ChatTranscript::new("hi");
        assert!(transcript.begin_send("   ").is_none());
        assert!(transcript.begin_send("").is_none());
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn send_appends_user_turn_then_placeholder() {
        let mut transcript = ChatTranscript::new("hi");
        let id = transcript.begin_send("  what is a limit?  ").unwrap();

        assert_eq!(transcript.len(), 3);
        match &transcript.entries()[1] {
            TranscriptEntry::Message(turn) => {
                assert_eq!(turn.speaker, Speaker::User);
                assert_eq!(turn.text, "what is a limit?");
            }
            other => panic!("expected user turn, got {:?}", other),
        }
        assert_eq!(transcript.entries()[2], TranscriptEntry::Typing(id));
    }

    #[test]
    fn reply_settles_in_the_placeholder_position() {
        let mut transcript = ChatTranscript::new("hi");
        let id = transcript.begin_send("question").unwrap();
        transcript.resolve_reply(id, "answer");

        assert_eq!(texts(&transcript), vec!["hi", "question", "answer"]);
        assert!(!transcript
            .entries()
            .iter()
            .any(|e| matches!(e, TranscriptEntry::Typing(_))));
    }

    #[test]
    fn racing_sends_resolve_independently_and_in_request_order() {
        let mut transcript = ChatTranscript::new("hi");
        let first = transcript.begin_send("first").unwrap();
        let second = transcript.begin_send("second").unwrap();

        // The second reply lands before the first; positions must not swap.
        transcript.resolve_reply(second, "reply two");
        transcript.resolve_reply(first, "reply one");

        assert_eq!(
            texts(&transcript),
            vec!["hi", "first", "reply one", "second", "reply two"]
        );
    }

    #[test]
    fn resolving_an_unknown_placeholder_is_a_noop() {
        let mut transcript = ChatTranscript::new("hi");
        let id = transcript.begin_send("question").unwrap();
        transcript.reseed("fresh greeting");

        // The reply raced with a reseed; it must not resurrect anything.
        transcript.resolve_reply(id, "stale answer");
        assert_eq!(texts(&transcript), vec!["fresh greeting"]);
    }

    #[test]
    fn clear_requires_confirmation() {
        let mut transcript = ChatTranscript::new("hi");
        transcript.begin_send("question").unwrap();

        assert!(!transcript.confirm_clear(None), "no clear was requested");
        assert_eq!(transcript.len(), 3);

        transcript.request_clear();
        transcript.cancel_clear();
        assert!(!transcript.confirm_clear(None));
        assert_eq!(transcript.len(), 3);

        transcript.request_clear();
        assert!(transcript.confirm_clear(Some("notes.pdf")));
        assert_eq!(transcript.len(), 1);
        assert!(transcript.turns().next().unwrap().text.contains("notes.pdf"));
    }
}
