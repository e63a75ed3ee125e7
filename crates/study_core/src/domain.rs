//! crates/study_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};

/// Identifies which independent context/chat/quiz slot an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Pdf,
    Video,
}

impl ContentType {
    /// The stable wire name used by the backend ("pdf" / "video").
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Pdf => "pdf",
            ContentType::Video => "video",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully ingested piece of content. Created when ingestion succeeds,
/// absent before ingestion and after a reset. Owned exclusively by the view
/// controller of its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentContext {
    pub id: String,
    pub display_name: String,
    pub source_size: Option<u64>,
}

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Ai,
}

/// One settled message in a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub rendered_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            rendered_at: Utc::now(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Ai,
            text: text.into(),
            rendered_at: Utc::now(),
        }
    }
}

/// A single multiple-choice question. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: [String; 4],
    pub correct_option_index: usize,
}

/// The outcome of grading a fully answered quiz. Derived at submission time,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub correct_count: usize,
    pub total_questions: usize,
    pub percentage: u8,
}

impl QuizResult {
    /// Computes the result for `correct_count` correct answers out of
    /// `total_questions`, with the percentage rounded to the nearest integer.
    pub fn new(correct_count: usize, total_questions: usize) -> Self {
        let percentage =
            (100.0 * correct_count as f64 / total_questions as f64).round() as u8;
        Self {
            correct_count,
            total_questions,
            percentage,
        }
    }

    pub fn tier(&self) -> FeedbackTier {
        FeedbackTier::from_percentage(self.percentage)
    }
}

/// Qualitative feedback bucket derived from the quiz percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTier {
    Excellent,
    Good,
    Fair,
    NeedsReview,
}

impl FeedbackTier {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            90..=u8::MAX => FeedbackTier::Excellent,
            70..=89 => FeedbackTier::Good,
            50..=69 => FeedbackTier::Fair,
            _ => FeedbackTier::NeedsReview,
        }
    }

    /// The fixed feedback line shown alongside the score.
    pub fn message(&self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Excellent! You have a strong grasp of the material.",
            FeedbackTier::Good => "Well done! You have a good understanding.",
            FeedbackTier::Fair => "Not bad, but reviewing some concepts is recommended.",
            FeedbackTier::NeedsReview => "We suggest going over the material again.",
        }
    }
}

/// One entry in the read-only list of past study sessions.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub content_type: ContentType,
    pub date: DateTime<Utc>,
    pub preview: String,
    pub turn_count: usize,
}

/// A fully loaded past session.
#[derive(Debug, Clone)]
pub struct SessionDetail {
    pub session_id: String,
    pub context: Option<ContentContext>,
    pub turns: Vec<Turn>,
}

/// A structured, user-presentable rejection. Returned to the caller instead
/// of being rendered directly, so the presentation layer decides how to show
/// it (modal, toast, inline).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Notice {
    /// Bad or missing user input. Rejected synchronously, no state mutated.
    #[error("{0}")]
    Validation(String),
    /// The action requires a prior successful ingestion. No network call is
    /// attempted.
    #[error("{0}")]
    MissingContext(String),
    /// A network or backend error. The UI has already reverted to its
    /// pre-action state; no raw error detail reaches the user.
    #[error("{0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_nearest_integer() {
        assert_eq!(QuizResult::new(5, 5).percentage, 100);
        assert_eq!(QuizResult::new(3, 5).percentage, 60);
        assert_eq!(QuizResult::new(1, 3).percentage, 33);
        assert_eq!(QuizResult::new(2, 3).percentage, 67);
        assert_eq!(QuizResult::new(0, 5).percentage, 0);
    }

    #[test]
    fn feedback_tier_thresholds() {
        assert_eq!(FeedbackTier::from_percentage(100), FeedbackTier::Excellent);
        assert_eq!(FeedbackTier::from_percentage(90), FeedbackTier::Excellent);
        assert_eq!(FeedbackTier::from_percentage(89), FeedbackTier::Good);
        assert_eq!(FeedbackTier::from_percentage(70), FeedbackTier::Good);
        assert_eq!(FeedbackTier::from_percentage(69), FeedbackTier::Fair);
        assert_eq!(FeedbackTier::from_percentage(50), FeedbackTier::Fair);
        assert_eq!(FeedbackTier::from_percentage(49), FeedbackTier::NeedsReview);
        assert_eq!(FeedbackTier::from_percentage(0), FeedbackTier::NeedsReview);
    }

    #[test]
    fn tier_follows_result_percentage() {
        assert_eq!(QuizResult::new(5, 5).tier(), FeedbackTier::Excellent);
        assert_eq!(QuizResult::new(3, 5).tier(), FeedbackTier::Fair);
    }
}
