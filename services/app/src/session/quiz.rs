//! services/app/src/session/quiz.rs
//!
//! The quiz engine: generation (with open/closed toggle semantics), single-
//! choice answer collection, one-shot grading, and fire-and-forget result
//! persistence.

use chrono::Utc;
use std::sync::Arc;
use study_core::domain::{ContentType, Notice, QuizQuestion, QuizResult};
use study_core::ports::{AnswerRecord, QuizResultRecord};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::session::state::{AppState, PanelState};

/// Visibility lifecycle of the quiz panel: hidden → loading → visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Hidden,
    Loading,
    Visible,
}

/// Opaque identifier for one in-flight generation request. A resolving
/// request mutates the panel only while its own ticket is still pending, so
/// a request the user dismissed cannot stomp a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GenerationTicket(Uuid);

/// The quiz state of one panel: the generated question set plus the user's
/// transient selections. Discarded wholesale when the panel closes or its
/// view controller resets.
#[derive(Debug)]
pub struct QuizPanel {
    phase: QuizPhase,
    questions: Vec<QuizQuestion>,
    selections: Vec<Option<usize>>,
    submitted: bool,
    pending: Option<GenerationTicket>,
}

impl QuizPanel {
    pub fn new() -> Self {
        Self {
            phase: QuizPhase::Hidden,
            questions: Vec::new(),
            selections: Vec::new(),
            submitted: false,
            pending: None,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn selections(&self) -> &[Option<usize>] {
        &self.selections
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Whether the panel currently occupies the screen (loading counts).
    pub fn is_open(&self) -> bool {
        !matches!(self.phase, QuizPhase::Hidden)
    }

    pub(crate) fn begin_loading(&mut self) -> GenerationTicket {
        let ticket = GenerationTicket(Uuid::new_v4());
        self.phase = QuizPhase::Loading;
        self.pending = Some(ticket);
        ticket
    }

    /// Whether `ticket`'s generation request is still the one the panel is
    /// waiting for. Closing the panel (or installing a set) retires it.
    pub(crate) fn is_pending(&self, ticket: GenerationTicket) -> bool {
        self.pending == Some(ticket)
    }

    /// Installs a freshly generated question set with no selections.
    pub(crate) fn install(&mut self, questions: Vec<QuizQuestion>) {
        self.selections = vec![None; questions.len()];
        self.questions = questions;
        self.submitted = false;
        self.phase = QuizPhase::Visible;
        self.pending = None;
    }

    /// Closes the panel and discards questions, selections, and any grade.
    pub fn close(&mut self) {
        *self = Self::new();
    }

    /// Marks `option_index` as the single selection for `question_index`,
    /// replacing any prior selection for that question only.
    pub fn select_option(&mut self, question_index: usize, option_index: usize) -> Result<(), Notice> {
        if self.phase != QuizPhase::Visible {
            return Err(Notice::Validation("No quiz is open.".to_string()));
        }
        if self.submitted {
            return Err(Notice::Validation(
                "This quiz was already submitted. Generate a new one to retry.".to_string(),
            ));
        }
        let Some(question) = self.questions.get(question_index) else {
            return Err(Notice::Validation(format!(
                "There is no question {}.",
                question_index + 1
            )));
        };
        if option_index >= question.options.len() {
            return Err(Notice::Validation(format!(
                "Question {} has no option {}.",
                question_index + 1,
                option_index + 1
            )));
        }
        self.selections[question_index] = Some(option_index);
        Ok(())
    }

    /// Grades the attempt. Rejects unless every question has a selection;
    /// on success the attempt becomes one-shot (no retraction afterward).
    pub fn grade(&mut self) -> Result<QuizResult, Notice> {
        if self.phase != QuizPhase::Visible || self.questions.is_empty() {
            return Err(Notice::Validation("No quiz is open.".to_string()));
        }
        if self.submitted {
            return Err(Notice::Validation(
                "This quiz was already submitted. Generate a new one to retry.".to_string(),
            ));
        }
        if self.selections.iter().any(Option::is_none) {
            return Err(Notice::Validation(
                "Please answer every question before submitting.".to_string(),
            ));
        }

        let correct_count = self
            .questions
            .iter()
            .zip(&self.selections)
            .filter(|(question, selected)| **selected == Some(question.correct_option_index))
            .count();
        self.submitted = true;
        Ok(QuizResult::new(correct_count, self.questions.len()))
    }

    /// The answers of a graded attempt, in question order, for persistence.
    pub fn answer_records(&self) -> Vec<AnswerRecord> {
        self.selections
            .iter()
            .enumerate()
            .filter_map(|(question_index, selected)| {
                selected.map(|selected_option_index| AnswerRecord {
                    question_index,
                    selected_option_index,
                })
            })
            .collect()
    }
}

impl Default for QuizPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizToggle {
    /// A quiz was generated and the panel opened with this many questions.
    Opened(usize),
    /// The panel was open (or loading) and has been closed instead.
    Closed,
}

/// Toggles the quiz panel. An open panel closes without regenerating; a
/// hidden one requires a loaded context and then generates a fresh question
/// set through the transport.
pub async fn toggle_quiz(
    app: Arc<AppState>,
    panel_lock: Arc<Mutex<PanelState>>,
) -> Result<QuizToggle, Notice> {
    let (content_id, content_type, ticket) = {
        let mut panel = panel_lock.lock().await;
        if panel.quiz.is_open() {
            panel.quiz.close();
            return Ok(QuizToggle::Closed);
        }
        let Some(content_id) = panel.context.as_ref().map(|context| context.id.clone()) else {
            return Err(Notice::MissingContext(format!(
                "Load a {} first to generate a quiz.",
                source_label(panel.content_type)
            )));
        };
        let ticket = panel.quiz.begin_loading();
        (content_id, panel.content_type, ticket)
    };

    let generated = app
        .transport
        .generate_quiz(&content_id, content_type, app.config.quiz_question_count)
        .await;

    match generated {
        Ok(questions) => {
            let mut panel = panel_lock.lock().await;
            if !panel.quiz.is_pending(ticket) {
                // Closed while the request was in flight; drop the result.
                return Ok(QuizToggle::Closed);
            }
            let count = questions.len();
            panel.quiz.install(questions);
            Ok(QuizToggle::Opened(count))
        }
        Err(e) => {
            warn!("quiz generation failed: {}", e);
            let mut panel = panel_lock.lock().await;
            if !panel.quiz.is_pending(ticket) {
                // The user already dismissed this request; nothing to report.
                return Ok(QuizToggle::Closed);
            }
            panel.quiz.close();
            Err(Notice::Transport(
                "Could not generate the quiz. Please try again.".to_string(),
            ))
        }
    }
}

/// Grades the current attempt and, on success, persists the record in the
/// background. A persistence failure is logged and never alters the result.
pub async fn submit_quiz(
    app: Arc<AppState>,
    panel_lock: Arc<Mutex<PanelState>>,
) -> Result<QuizResult, Notice> {
    let (result, record) = {
        let mut panel = panel_lock.lock().await;
        let result = panel.quiz.grade()?;
        let record = QuizResultRecord {
            content_type: panel.content_type,
            answers: panel.quiz.answer_records(),
            correct_count: result.correct_count,
            total_questions: result.total_questions,
            timestamp: Utc::now(),
        };
        (result, record)
    };

    let transport = app.transport.clone();
    tokio::spawn(async move {
        if let Err(e) = transport.persist_quiz_result(record).await {
            warn!("failed to persist quiz result: {}", e);
        }
    });

    Ok(result)
}

fn source_label(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Pdf => "PDF",
        ContentType::Video => "video",
    }
}
