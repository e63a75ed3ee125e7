//! services/app/src/session/controller.rs
//!
//! The per-panel view controller: source validation, the ingestion state
//! machine, and reset.

use std::sync::Arc;
use study_core::domain::{ContentContext, ContentType, Notice};
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::session::state::{AppState, PanelState, ViewPhase};

/// A source the user picked for ingestion: a local PDF file or a YouTube link.
#[derive(Debug, Clone)]
pub enum SourceDescriptor {
    PdfFile { file_name: String, payload: Vec<u8> },
    VideoUrl { url: String },
}

impl SourceDescriptor {
    /// What the selection surface shows for this source.
    pub fn label(&self) -> &str {
        match self {
            SourceDescriptor::PdfFile { file_name, .. } => file_name,
            SourceDescriptor::VideoUrl { url } => url,
        }
    }
}

/// The greeting a panel starts (and resets) with, before any ingestion.
pub fn default_greeting(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Pdf => "Hi! Upload a PDF and I'll help you work through the content.",
        ContentType::Video => "Hi! Paste a YouTube link and I'll help you understand the video.",
    }
}

fn ready_greeting(content_type: ContentType, display_name: &str) -> String {
    match content_type {
        ContentType::Pdf => format!(
            "Hi! I've processed your PDF \"{}\". You can ask me anything about it.",
            display_name
        ),
        ContentType::Video => format!(
            "Hi! I've analyzed the video \"{}\". Ask me whatever you need.",
            display_name
        ),
    }
}

/// Converts a YouTube watch or short link into an embeddable player URL.
/// Returns `None` for anything that is not a recognizable YouTube link.
pub fn youtube_embed_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let video_id = match parsed.host_str()? {
        // Short link: https://youtu.be/VIDEO_ID
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string),
        // Normal link: https://www.youtube.com/watch?v=VIDEO_ID
        "youtube.com" | "www.youtube.com" => parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        _ => None,
    }?;
    if video_id.is_empty() {
        return None;
    }
    Some(format!("https://www.youtube.com/embed/{}", video_id))
}

/// Validates the source against the panel's content type and derives the
/// viewer target (file name, or the video's embed URL). Pure; no state is
/// touched on rejection.
fn validate_source(content_type: ContentType, source: &SourceDescriptor) -> Result<String, Notice> {
    match (content_type, source) {
        (ContentType::Pdf, SourceDescriptor::PdfFile { file_name, payload }) => {
            if !file_name.to_lowercase().ends_with(".pdf") || payload.is_empty() {
                return Err(Notice::Validation(
                    "Please choose a valid PDF file.".to_string(),
                ));
            }
            Ok(file_name.clone())
        }
        (ContentType::Video, SourceDescriptor::VideoUrl { url }) => {
            youtube_embed_url(url).ok_or_else(|| {
                Notice::Validation(
                    "Please enter a valid YouTube URL (e.g. .../watch?v=... or youtu.be/...)."
                        .to_string(),
                )
            })
        }
        (ContentType::Pdf, SourceDescriptor::VideoUrl { .. }) => Err(Notice::Validation(
            "This panel only accepts PDF files.".to_string(),
        )),
        (ContentType::Video, SourceDescriptor::PdfFile { .. }) => Err(Notice::Validation(
            "This panel only accepts YouTube links.".to_string(),
        )),
    }
}

/// Runs one ingestion end to end: validate, transition to `Ingesting`
/// (reachable only from `Empty`), call the transport, and either install the
/// context with its greeting or revert to the upload surface.
pub async fn ingest_source(
    app: Arc<AppState>,
    panel_lock: Arc<Mutex<PanelState>>,
    source: SourceDescriptor,
) -> Result<ContentContext, Notice> {
    let viewer_target = {
        let mut panel = panel_lock.lock().await;
        match panel.phase {
            // The trigger is disabled while a request is in flight.
            ViewPhase::Ingesting => {
                return Err(Notice::Validation(
                    "An ingestion is already in progress.".to_string(),
                ));
            }
            // Loading something else over ready content goes through reset,
            // so a failure here can never destroy a working context.
            ViewPhase::Ready => {
                return Err(Notice::Validation(
                    "Content is already loaded. Reset the panel to load something else."
                        .to_string(),
                ));
            }
            ViewPhase::Empty => {}
        }
        let viewer_target = validate_source(panel.content_type, &source)?;
        panel.selected_source = Some(source.label().to_string());
        panel.phase = ViewPhase::Ingesting;
        viewer_target
    };

    let ingested = match &source {
        SourceDescriptor::PdfFile { file_name, payload } => app
            .transport
            .ingest_document(file_name, payload)
            .await
            .map(|d| ContentContext {
                id: d.content_id,
                display_name: d.display_name,
                source_size: Some(payload.len() as u64),
            }),
        SourceDescriptor::VideoUrl { url } => {
            app.transport.ingest_video(url).await.map(|v| ContentContext {
                id: v.content_id,
                display_name: v.title,
                source_size: None,
            })
        }
    };

    match ingested {
        Ok(context) => {
            let mut panel = panel_lock.lock().await;
            info!(
                "{} ingestion complete: {} ({})",
                panel.content_type, context.display_name, context.id
            );
            panel.context = Some(context.clone());
            panel.viewer_target = Some(viewer_target);
            panel.phase = ViewPhase::Ready;
            let greeting = ready_greeting(panel.content_type, &context.display_name);
            panel.transcript.reseed(greeting);
            Ok(context)
        }
        Err(e) => {
            warn!("ingestion failed: {}", e);
            let mut panel = panel_lock.lock().await;
            // Back to the upload surface; the selection is kept for a retry,
            // but no partial context is retained.
            panel.phase = ViewPhase::Empty;
            panel.context = None;
            panel.viewer_target = None;
            Err(Notice::Transport(match panel.content_type {
                ContentType::Pdf => "Could not process the PDF. Please try again.".to_string(),
                ContentType::Video => {
                    "Could not process the video. Check the URL and try again.".to_string()
                }
            }))
        }
    }
}

/// Returns the panel to its pristine state: no context, no selection, blank
/// viewer, discarded quiz, and the single default greeting. Idempotent;
/// callable from any state.
pub fn reset(panel: &mut PanelState) {
    panel.phase = ViewPhase::Empty;
    panel.context = None;
    panel.selected_source = None;
    panel.viewer_target = None;
    panel.quiz.close();
    panel.transcript.reseed(default_greeting(panel.content_type));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_links_convert_to_embed_urls() {
        assert_eq!(
            youtube_embed_url("https://www.youtube.com/watch?v=abc123").as_deref(),
            Some("https://www.youtube.com/embed/abc123")
        );
        assert_eq!(
            youtube_embed_url("https://youtube.com/watch?v=abc123&t=4s").as_deref(),
            Some("https://www.youtube.com/embed/abc123")
        );
        assert_eq!(
            youtube_embed_url("https://youtu.be/xyz789").as_deref(),
            Some("https://www.youtube.com/embed/xyz789")
        );
    }

    #[test]
    fn non_youtube_links_are_rejected() {
        assert!(youtube_embed_url("https://vimeo.com/12345").is_none());
        assert!(youtube_embed_url("https://www.youtube.com/watch").is_none());
        assert!(youtube_embed_url("not a url at all").is_none());
    }

    #[test]
    fn pdf_sources_must_be_pdfs() {
        let good = SourceDescriptor::PdfFile {
            file_name: "Notes.PDF".to_string(),
            payload: vec![1, 2, 3],
        };
        assert!(validate_source(ContentType::Pdf, &good).is_ok());

        let wrong_extension = SourceDescriptor::PdfFile {
            file_name: "notes.txt".to_string(),
            payload: vec![1, 2, 3],
        };
        assert!(validate_source(ContentType::Pdf, &wrong_extension).is_err());

        let empty = SourceDescriptor::PdfFile {
            file_name: "notes.pdf".to_string(),
            payload: Vec::new(),
        };
        assert!(validate_source(ContentType::Pdf, &empty).is_err());
    }

    #[test]
    fn sources_cannot_cross_panels() {
        let video = SourceDescriptor::VideoUrl {
            url: "https://youtu.be/xyz789".to_string(),
        };
        assert!(matches!(
            validate_source(ContentType::Pdf, &video),
            Err(Notice::Validation(_))
        ));

        let pdf = SourceDescriptor::PdfFile {
            file_name: "notes.pdf".to_string(),
            payload: vec![1],
        };
        assert!(matches!(
            validate_source(ContentType::Video, &pdf),
            Err(Notice::Validation(_))
        ));
    }
}
