//! Wire-level tests for the live transport, against a stubbed backend.

use app_lib::adapters::http::HttpTransport;
use chrono::Utc;
use serde_json::json;
use study_core::domain::ContentType;
use study_core::ports::{AnswerRecord, ChatTurnRequest, QuizResultRecord, TransportService};
use wiremock::matchers::{body_json_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn chat_turn_carries_the_bearer_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "A limit describes the value a function approaches.",
            "timestamp": "2024-11-05T10:30:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri(), Some("token-123".to_string())).unwrap();
    let reply = transport
        .send_chat_turn(ChatTurnRequest {
            message: "what is a limit?".to_string(),
            content_id: Some("pdf_123".to_string()),
            content_type: ContentType::Pdf,
            timestamp: Utc::now(),
        })
        .await
        .unwrap();

    assert_eq!(reply.reply, "A limit describes the value a function approaches.");
}

#[tokio::test]
async fn requests_without_a_credential_omit_the_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": [] })))
        .mount(&server)
        .await;

    // Absence of a credential is the auth layer's problem, not a client error.
    let transport = HttpTransport::new(server.uri(), None).unwrap();
    let sessions = transport.list_history().await.unwrap();
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn video_ingestion_posts_the_url_and_maps_the_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process/video"))
        .and(body_json_string(
            json!({ "url": "https://youtu.be/abc123" }).to_string(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video_id": "video_42",
            "title": "Differential Calculus",
            "url": "https://youtu.be/abc123",
            "duration": "15:30",
            "status": "processed"
        })))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri(), None).unwrap();
    let ingest = transport.ingest_video("https://youtu.be/abc123").await.unwrap();
    assert_eq!(ingest.content_id, "video_42");
    assert_eq!(ingest.title, "Differential Calculus");
    assert_eq!(ingest.status, "processed");
}

#[tokio::test]
async fn document_ingestion_maps_the_backend_acknowledgement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_id": "pdf_9",
            "filename": "calculo.pdf",
            "status": "processed",
            "page_count": 45
        })))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri(), Some("token".to_string())).unwrap();
    let ingest = transport
        .ingest_document("calculo.pdf", b"%PDF-1.4")
        .await
        .unwrap();
    assert_eq!(ingest.content_id, "pdf_9");
    assert_eq!(ingest.display_name, "calculo.pdf");
    assert_eq!(ingest.page_count, 45);
}

#[tokio::test]
async fn quiz_generation_parses_the_question_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/quiz/generate"))
        .and(body_json_string(
            json!({
                "context_id": "pdf_9",
                "type": "pdf",
                "num_questions": 5
            })
            .to_string(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "questions": [{
                "question": "What is a limit?",
                "options": ["A", "B", "C", "D"],
                "correct": 2
            }]
        })))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri(), None).unwrap();
    let questions = transport
        .generate_quiz("pdf_9", ContentType::Pdf, 5)
        .await
        .unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].prompt, "What is a limit?");
    assert_eq!(questions[0].correct_option_index, 2);
}

#[tokio::test]
async fn quiz_result_persistence_posts_the_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/quiz/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "saved" })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri(), None).unwrap();
    transport
        .persist_quiz_result(QuizResultRecord {
            content_type: ContentType::Pdf,
            answers: vec![AnswerRecord {
                question_index: 0,
                selected_option_index: 2,
            }],
            correct_count: 1,
            total_questions: 1,
            timestamp: Utc::now(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn history_maps_wire_names_onto_domain_types() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "history": [{
                "id": "session_123",
                "title": "Calculo.pdf",
                "type": "pdf",
                "date": "2024-11-05T10:00:00Z",
                "preview": "Chat about limits",
                "message_count": 15
            }, {
                "id": "session_124",
                "title": "Video: Waves",
                "type": "video",
                "date": "2024-11-04T10:00:00Z",
                "preview": "Questions about propagation",
                "message_count": 8
            }]
        })))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri(), None).unwrap();
    let sessions = transport.list_history().await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].content_type, ContentType::Pdf);
    assert_eq!(sessions[0].turn_count, 15);
    assert_eq!(sessions[1].content_type, ContentType::Video);
}

#[tokio::test]
async fn fetch_session_rebuilds_turns_and_context() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history/session_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "session_123",
            "context": { "file_id": "pdf_9", "filename": "calculo.pdf" },
            "messages": [
                { "type": "user", "message": "What is a limit?", "timestamp": "2024-11-05T10:00:00Z" },
                { "type": "ai", "message": "A limit is...", "timestamp": "2024-11-05T10:00:05Z" }
            ]
        })))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri(), None).unwrap();
    let detail = transport.fetch_session("session_123").await.unwrap();
    assert_eq!(detail.session_id, "session_123");
    assert_eq!(detail.context.unwrap().display_name, "calculo.pdf");
    assert_eq!(detail.turns.len(), 2);
    assert_eq!(detail.turns[0].text, "What is a limit?");
}

#[tokio::test]
async fn any_non_success_status_is_a_uniform_generic_failure() {
    let server = MockServer::start().await;
    for (route, status) in [("/chat", 500), ("/history", 401), ("/quiz/generate", 404)] {
        Mock::given(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let transport = HttpTransport::new(server.uri(), None).unwrap();
    assert!(transport
        .send_chat_turn(ChatTurnRequest {
            message: "hi".to_string(),
            content_id: Some("pdf_1".to_string()),
            content_type: ContentType::Pdf,
            timestamp: Utc::now(),
        })
        .await
        .is_err());
    assert!(transport.list_history().await.is_err());
    assert!(transport
        .generate_quiz("pdf_1", ContentType::Pdf, 5)
        .await
        .is_err());
}
