//! services/app/src/adapters/http.rs
//!
//! The live implementation of the `TransportService` port: authenticated HTTP
//! calls against the study backend. Every request carries the configured
//! bearer credential when one is present; any non-success response is mapped
//! uniformly to a generic port error, without per-status branching.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use study_core::domain::{
    ContentContext, ContentType, QuizQuestion, SessionDetail, SessionSummary, Speaker, Turn,
};
use study_core::ports::{
    ChatTurnReply, ChatTurnRequest, DocumentIngest, PortError, PortResult, QuizResultRecord,
    TransportService, VideoIngest,
};

/// An adapter that talks to the real backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<String>,
    ) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| PortError::Unexpected(format!("could not build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the bearer credential when one was configured. An absent
    /// credential is not an error here; rejecting it is the backend's call.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> PortResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Unexpected(format!("backend returned {}", status)));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// Wire DTOs
//=========================================================================================

#[derive(Debug, Deserialize)]
struct DocumentIngestDto {
    file_id: String,
    filename: String,
    status: String,
    page_count: u32,
}

#[derive(Debug, Serialize)]
struct VideoIngestRequestDto<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct VideoIngestDto {
    video_id: String,
    title: String,
    url: String,
    duration: String,
    status: String,
}

#[derive(Debug, Serialize)]
struct ChatRequestDto<'a> {
    message: &'a str,
    context_id: Option<&'a str>,
    #[serde(rename = "type")]
    content_type: &'a str,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyDto {
    reply: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct QuizRequestDto<'a> {
    context_id: &'a str,
    #[serde(rename = "type")]
    content_type: &'a str,
    num_questions: usize,
}

#[derive(Debug, Deserialize)]
struct QuizResponseDto {
    questions: Vec<QuizQuestionDto>,
}

#[derive(Debug, Deserialize)]
struct QuizQuestionDto {
    question: String,
    options: [String; 4],
    correct: usize,
}

#[derive(Debug, Serialize)]
struct AnswerDto {
    question: usize,
    answer: usize,
}

#[derive(Debug, Serialize)]
struct QuizResultRequestDto<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    answers: Vec<AnswerDto>,
    correct_count: usize,
    total_questions: usize,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponseDto {
    history: Vec<HistoryItemDto>,
}

#[derive(Debug, Deserialize)]
struct HistoryItemDto {
    id: String,
    title: String,
    #[serde(rename = "type")]
    content_type: String,
    date: DateTime<Utc>,
    preview: String,
    message_count: usize,
}

#[derive(Debug, Deserialize)]
struct SessionDetailDto {
    session_id: String,
    context: Option<serde_json::Value>,
    messages: Vec<SessionTurnDto>,
}

#[derive(Debug, Deserialize)]
struct SessionTurnDto {
    #[serde(rename = "type")]
    speaker: String,
    message: String,
    timestamp: DateTime<Utc>,
}

fn content_type_from_wire(raw: &str) -> ContentType {
    if raw == "video" {
        ContentType::Video
    } else {
        ContentType::Pdf
    }
}

/// The backend is loose about the stored context shape; try the id fields
/// the way the original client does (`file_id` for PDFs, `video_id` for
/// videos) and fall back to the id when no display name is stored.
fn context_from_value(value: &serde_json::Value) -> Option<ContentContext> {
    let id = value
        .get("file_id")
        .or_else(|| value.get("video_id"))
        .or_else(|| value.get("context_id"))
        .and_then(|v| v.as_str())?;
    let display_name = value
        .get("filename")
        .or_else(|| value.get("title"))
        .and_then(|v| v.as_str())
        .unwrap_or(id);
    Some(ContentContext {
        id: id.to_string(),
        display_name: display_name.to_string(),
        source_size: value.get("size").and_then(|v| v.as_u64()),
    })
}

fn question_from_dto(dto: QuizQuestionDto) -> PortResult<QuizQuestion> {
    if dto.correct >= dto.options.len() {
        return Err(PortError::Unexpected(format!(
            "quiz question has out-of-range correct index {}",
            dto.correct
        )));
    }
    Ok(QuizQuestion {
        prompt: dto.question,
        options: dto.options,
        correct_option_index: dto.correct,
    })
}

//=========================================================================================
// `TransportService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TransportService for HttpTransport {
    async fn ingest_document(&self, file_name: &str, payload: &[u8]) -> PortResult<DocumentIngest> {
        let part = multipart::Part::bytes(payload.to_vec())
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let form = multipart::Form::new().part("pdf", part);

        let response = self
            .authorize(self.client.post(self.endpoint("/process/pdf")))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let dto: DocumentIngestDto = Self::read_json(response).await?;
        Ok(DocumentIngest {
            content_id: dto.file_id,
            display_name: dto.filename,
            status: dto.status,
            page_count: dto.page_count,
        })
    }

    async fn ingest_video(&self, url: &str) -> PortResult<VideoIngest> {
        let response = self
            .authorize(self.client.post(self.endpoint("/process/video")))
            .json(&VideoIngestRequestDto { url })
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let dto: VideoIngestDto = Self::read_json(response).await?;
        Ok(VideoIngest {
            content_id: dto.video_id,
            title: dto.title,
            url: dto.url,
            duration: dto.duration,
            status: dto.status,
        })
    }

    async fn send_chat_turn(&self, request: ChatTurnRequest) -> PortResult<ChatTurnReply> {
        let body = ChatRequestDto {
            message: &request.message,
            context_id: request.content_id.as_deref(),
            content_type: request.content_type.as_str(),
            timestamp: request.timestamp,
        };
        let response = self
            .authorize(self.client.post(self.endpoint("/chat")))
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let dto: ChatReplyDto = Self::read_json(response).await?;
        Ok(ChatTurnReply {
            reply: dto.reply,
            timestamp: dto.timestamp,
        })
    }

    async fn generate_quiz(
        &self,
        content_id: &str,
        content_type: ContentType,
        question_count: usize,
    ) -> PortResult<Vec<QuizQuestion>> {
        let body = QuizRequestDto {
            context_id: content_id,
            content_type: content_type.as_str(),
            num_questions: question_count,
        };
        let response = self
            .authorize(self.client.post(self.endpoint("/quiz/generate")))
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let dto: QuizResponseDto = Self::read_json(response).await?;
        dto.questions.into_iter().map(question_from_dto).collect()
    }

    async fn persist_quiz_result(&self, record: QuizResultRecord) -> PortResult<()> {
        let body = QuizResultRequestDto {
            content_type: record.content_type.as_str(),
            answers: record
                .answers
                .iter()
                .map(|a| AnswerDto {
                    question: a.question_index,
                    answer: a.selected_option_index,
                })
                .collect(),
            correct_count: record.correct_count,
            total_questions: record.total_questions,
            timestamp: record.timestamp,
        };
        let response = self
            .authorize(self.client.post(self.endpoint("/quiz/results")))
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Unexpected(format!("backend returned {}", status)));
        }
        Ok(())
    }

    async fn list_history(&self) -> PortResult<Vec<SessionSummary>> {
        let response = self
            .authorize(self.client.get(self.endpoint("/history")))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let dto: HistoryResponseDto = Self::read_json(response).await?;
        Ok(dto
            .history
            .into_iter()
            .map(|item| SessionSummary {
                id: item.id,
                title: item.title,
                content_type: content_type_from_wire(&item.content_type),
                date: item.date,
                preview: item.preview,
                turn_count: item.message_count,
            })
            .collect())
    }

    async fn fetch_session(&self, session_id: &str) -> PortResult<SessionDetail> {
        let response = self
            .authorize(self.client.get(self.endpoint(&format!("/history/{}", session_id))))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let dto: SessionDetailDto = Self::read_json(response).await?;
        Ok(SessionDetail {
            session_id: dto.session_id,
            context: dto.context.as_ref().and_then(context_from_value),
            turns: dto
                .messages
                .into_iter()
                .map(|m| Turn {
                    speaker: if m.speaker == "user" {
                        Speaker::User
                    } else {
                        Speaker::Ai
                    },
                    text: m.message,
                    rendered_at: m.timestamp,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_transport_trims_trailing_slash() {
        let transport = HttpTransport::new("http://localhost:3000/api/", None).unwrap();
        assert_eq!(transport.endpoint("/chat"), "http://localhost:3000/api/chat");
    }

    #[test]
    fn chat_request_serialization_matches_expected_shape() {
        let timestamp: DateTime<Utc> = "2024-11-05T10:30:00Z".parse().unwrap();
        let body = ChatRequestDto {
            message: "what is a limit?",
            context_id: Some("pdf_123"),
            content_type: "pdf",
            timestamp,
        };

        let value = serde_json::to_value(&body).unwrap();
        let expected = serde_json::json!({
            "message": "what is a limit?",
            "context_id": "pdf_123",
            "type": "pdf",
            "timestamp": "2024-11-05T10:30:00Z",
        });
        assert_eq!(value, expected);
    }

    #[test]
    fn quiz_response_deserialization_works() {
        let raw = serde_json::json!({
            "questions": [{
                "question": "What is a limit?",
                "options": ["A", "B", "C", "D"],
                "correct": 2
            }]
        });
        let parsed: QuizResponseDto = serde_json::from_value(raw).unwrap();
        let question = question_from_dto(parsed.questions.into_iter().next().unwrap()).unwrap();
        assert_eq!(question.prompt, "What is a limit?");
        assert_eq!(question.correct_option_index, 2);
    }

    #[test]
    fn out_of_range_correct_index_is_rejected() {
        let dto = QuizQuestionDto {
            question: "broken".to_string(),
            options: ["A".into(), "B".into(), "C".into(), "D".into()],
            correct: 4,
        };
        assert!(question_from_dto(dto).is_err());
    }

    #[test]
    fn session_context_accepts_pdf_and_video_ids() {
        let pdf = serde_json::json!({ "file_id": "pdf_9", "filename": "calc.pdf" });
        let ctx = context_from_value(&pdf).unwrap();
        assert_eq!(ctx.id, "pdf_9");
        assert_eq!(ctx.display_name, "calc.pdf");

        let video = serde_json::json!({ "video_id": "video_7" });
        let ctx = context_from_value(&video).unwrap();
        assert_eq!(ctx.id, "video_7");
        assert_eq!(ctx.display_name, "video_7");

        assert!(context_from_value(&serde_json::json!({})).is_none());
    }
}
