//! services/app/src/adapters/mock.rs
//!
//! A fully local implementation of the `TransportService` port, used when no
//! backend is configured. It produces canned chat replies, a fixed quiz
//! question set, and a canned session history, with an optional simulated
//! latency so the loading states stay observable.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use study_core::domain::{ContentType, QuizQuestion, SessionDetail, SessionSummary};
use study_core::ports::{
    ChatTurnReply, ChatTurnRequest, DocumentIngest, PortError, PortResult, QuizResultRecord,
    TransportService, VideoIngest,
};

const EXPLANATIONS: [&str; 5] = [
    "this concept refers to the fundamentals you should understand first, since they form the base for more advanced topics",
    "the method consists of a series of systematic steps: first you identify the problem, then you analyze it, and finally you apply the solution",
    "the theory states a direct relationship between the variables: when one increases, the other changes proportionally",
    "this principle shows up in many contexts, and you can observe it in practice when working through real cases",
    "the formal definition describes a process that reaches a specific goal by following established rules",
];

/// Mock transport. Holds no per-session state beyond rotation cursors, so a
/// single instance can serve both content types.
pub struct MockTransport {
    latency: Duration,
    reply_cursor: AtomicUsize,
    explanation_cursor: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Simulates the given delay before every response, mimicking a slow
    /// backend so loading indicators can be exercised.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            reply_cursor: AtomicUsize::new(0),
            explanation_cursor: AtomicUsize::new(0),
        }
    }

    async fn simulate_work(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Rotates through the canned reply shells and explanations. Rotation
    /// instead of randomness keeps the output deterministic under test.
    fn next_reply(&self) -> String {
        let explanation =
            EXPLANATIONS[self.explanation_cursor.fetch_add(1, Ordering::Relaxed) % EXPLANATIONS.len()];
        match self.reply_cursor.fetch_add(1, Ordering::Relaxed) % 5 {
            0 => format!("Great question. Based on the material, {}.", explanation),
            1 => format!("According to the document, {}.", explanation),
            2 => format!(
                "Let me help you with that. In short, {}.\n\nDo you have any other questions about this topic?",
                explanation
            ),
            3 => format!("Good question. The material mentions that {}.", explanation),
            _ => format!(
                "Put simply: {}.\n\nWant me to go deeper into any specific aspect?",
                explanation
            ),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed question set handed out for every mock quiz. The correct option
/// sits at a fixed position per question, never randomized.
fn fixed_quiz() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion {
            prompt: "What is the main concept explained in the material?".to_string(),
            options: [
                "Core concepts and their practical application".to_string(),
                "Advanced theory with no applications".to_string(),
                "Obsolete historical methods".to_string(),
                "Basic definitions without context".to_string(),
            ],
            correct_option_index: 0,
        },
        QuizQuestion {
            prompt: "Which method is recommended for solving problems on this topic?".to_string(),
            options: [
                "Memorization without understanding".to_string(),
                "Systematic analysis and practical application".to_string(),
                "Random trial and error".to_string(),
                "Consulting only the conclusions".to_string(),
            ],
            correct_option_index: 1,
        },
        QuizQuestion {
            prompt: "What is the most important application of the studied content?".to_string(),
            options: [
                "It has no practical applications".to_string(),
                "Theoretical exams only".to_string(),
                "Solving real problems in the field".to_string(),
                "Academic research exclusively".to_string(),
            ],
            correct_option_index: 2,
        },
        QuizQuestion {
            prompt: "Which aspect is essential to fully understand the topic?".to_string(),
            options: [
                "Memorizing every formula".to_string(),
                "Understanding the base concepts and how they relate".to_string(),
                "Reading only the summaries".to_string(),
                "Focusing exclusively on special cases".to_string(),
            ],
            correct_option_index: 1,
        },
        QuizQuestion {
            prompt: "How does this topic relate to other concepts in the course?".to_string(),
            options: [
                "It is completely independent".to_string(),
                "It is part of a logical learning sequence".to_string(),
                "It has no relation to other topics".to_string(),
                "It only appears at the end of the course".to_string(),
            ],
            correct_option_index: 1,
        },
    ]
}

#[async_trait]
impl TransportService for MockTransport {
    async fn ingest_document(&self, file_name: &str, payload: &[u8]) -> PortResult<DocumentIngest> {
        self.simulate_work().await;
        Ok(DocumentIngest {
            content_id: format!("pdf_{}", Uuid::new_v4().simple()),
            display_name: file_name.to_string(),
            status: "processed".to_string(),
            page_count: (payload.len() / 4096 + 1) as u32,
        })
    }

    async fn ingest_video(&self, url: &str) -> PortResult<VideoIngest> {
        self.simulate_work().await;
        Ok(VideoIngest {
            content_id: format!("video_{}", Uuid::new_v4().simple()),
            title: "YouTube video".to_string(),
            url: url.to_string(),
            duration: "15:30".to_string(),
            status: "processed".to_string(),
        })
    }

    async fn send_chat_turn(&self, request: ChatTurnRequest) -> PortResult<ChatTurnReply> {
        self.simulate_work().await;
        debug!("mock reply for {} question: '{}'", request.content_type, request.message);
        Ok(ChatTurnReply {
            reply: self.next_reply(),
            timestamp: Utc::now(),
        })
    }

    async fn generate_quiz(
        &self,
        _content_id: &str,
        _content_type: ContentType,
        question_count: usize,
    ) -> PortResult<Vec<QuizQuestion>> {
        self.simulate_work().await;
        // The canned set tops out at five questions.
        let mut questions = fixed_quiz();
        questions.truncate(question_count);
        Ok(questions)
    }

    async fn persist_quiz_result(&self, record: QuizResultRecord) -> PortResult<()> {
        // The mock keeps nothing; this is what makes "persist only against a
        // real backend" fall out of transport selection.
        debug!(
            "mock discarding quiz result for {}: {}/{}",
            record.content_type, record.correct_count, record.total_questions
        );
        Ok(())
    }

    async fn list_history(&self) -> PortResult<Vec<SessionSummary>> {
        let now = Utc::now();
        Ok(vec![
            SessionSummary {
                id: "session_mock_1".to_string(),
                title: "Differential Calculus - Chapter 3.pdf".to_string(),
                content_type: ContentType::Pdf,
                date: now,
                preview: "Chat about limits and continuity".to_string(),
                turn_count: 15,
            },
            SessionSummary {
                id: "session_mock_2".to_string(),
                title: "Video: Differential Equations".to_string(),
                content_type: ContentType::Video,
                date: now - ChronoDuration::days(1),
                preview: "Questions about solution methods".to_string(),
                turn_count: 8,
            },
            SessionSummary {
                id: "session_mock_3".to_string(),
                title: "Physics II - Waves.pdf".to_string(),
                content_type: ContentType::Pdf,
                date: now - ChronoDuration::days(2),
                preview: "Questions about wave propagation".to_string(),
                turn_count: 11,
            },
        ])
    }

    async fn fetch_session(&self, session_id: &str) -> PortResult<SessionDetail> {
        // Stored sessions only exist once a backend is connected.
        Err(PortError::NotFound(format!(
            "session '{}' is not available without a backend",
            session_id
        )))
    }

    fn requires_context(&self) -> bool {
        false
    }
}
