//! services/app/src/bin/app.rs
//!
//! A terminal front end over the interaction core. Wires configuration to a
//! transport (mock or live), keeps one panel per content type plus an active
//! tab, and turns input lines into session operations.

use app_lib::{
    adapters::{http::HttpTransport, mock::MockTransport},
    config::{Config, ConfigError, TransportMode},
    error::AppError,
    session::{
        self, chat, controller, history, quiz, AppState, PanelState, QuizPhase, SourceDescriptor,
        TranscriptEntry, ViewPhase,
    },
};
use std::path::Path;
use std::sync::Arc;
use study_core::domain::{ContentType, Notice, QuizResult, Speaker};
use study_core::ports::TransportService;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- 2. Select the Transport ---
    let transport: Arc<dyn TransportService> = match config.transport_mode {
        TransportMode::Mock => {
            info!("Starting with the mock transport (no backend).");
            Arc::new(MockTransport::with_latency(config.mock_latency))
        }
        TransportMode::Live => {
            let base_url = config
                .backend_url
                .clone()
                .ok_or_else(|| ConfigError::MissingVar("BACKEND_URL".to_string()))?;
            info!("Starting against the backend at {}.", base_url);
            Arc::new(HttpTransport::new(base_url, config.auth_token.clone())?)
        }
    };

    // --- 3. Build the Shared State and the Two Panels ---
    let app = Arc::new(AppState {
        transport,
        config: config.clone(),
    });
    let pdf_panel = Arc::new(Mutex::new(PanelState::new(ContentType::Pdf)));
    let video_panel = Arc::new(Mutex::new(PanelState::new(ContentType::Video)));
    let mut active = ContentType::Pdf;

    println!("study-companion — type 'help' for commands");
    render_panel(&panel_for(active, &pdf_panel, &video_panel)).await;

    // --- 4. The Event Loop ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line.as_str(), ""),
        };
        let panel = panel_for(active, &pdf_panel, &video_panel);

        match command {
            "help" => print_help(),
            "quit" | "exit" => break,
            "tab" => match rest {
                "pdf" => {
                    active = ContentType::Pdf;
                    render_panel(&pdf_panel).await;
                }
                "video" => {
                    active = ContentType::Video;
                    render_panel(&video_panel).await;
                }
                _ => println!("! usage: tab pdf|video"),
            },
            "pdf" => {
                if rest.is_empty() {
                    println!("! usage: pdf <path-to-file>");
                    continue;
                }
                match tokio::fs::read(rest).await {
                    Ok(payload) => {
                        let file_name = Path::new(rest)
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| rest.to_string());
                        active = ContentType::Pdf;
                        println!("Processing {}...", file_name);
                        let outcome = controller::ingest_source(
                            app.clone(),
                            pdf_panel.clone(),
                            SourceDescriptor::PdfFile { file_name, payload },
                        )
                        .await;
                        report(outcome.map(|_| ()));
                        render_panel(&pdf_panel).await;
                    }
                    Err(e) => println!("! could not read '{}': {}", rest, e),
                }
            }
            "video" => {
                if rest.is_empty() {
                    println!("! usage: video <youtube-url>");
                    continue;
                }
                active = ContentType::Video;
                println!("Processing video...");
                let outcome = controller::ingest_source(
                    app.clone(),
                    video_panel.clone(),
                    SourceDescriptor::VideoUrl { url: rest.to_string() },
                )
                .await;
                report(outcome.map(|_| ()));
                render_panel(&video_panel).await;
            }
            "say" => {
                chat::send_chat_message(app.clone(), panel.clone(), rest).await;
                render_panel(&panel).await;
            }
            "clear" => {
                panel.lock().await.transcript.request_clear();
                println!("Clear the chat? Type 'yes' to confirm or 'no' to cancel.");
            }
            "yes" => {
                let mut guard = panel.lock().await;
                let display_name = guard.context.as_ref().map(|c| c.display_name.clone());
                if guard.transcript.confirm_clear(display_name.as_deref()) {
                    drop(guard);
                    render_panel(&panel).await;
                } else {
                    println!("! nothing to confirm");
                }
            }
            "no" => {
                panel.lock().await.transcript.cancel_clear();
                println!("Clear cancelled.");
            }
            "quiz" => {
                let outcome = quiz::toggle_quiz(app.clone(), panel.clone()).await;
                match outcome {
                    Ok(quiz::QuizToggle::Opened(count)) => {
                        println!("Quiz ready: {} questions.", count);
                        render_panel(&panel).await;
                    }
                    Ok(quiz::QuizToggle::Closed) => println!("Quiz closed."),
                    Err(notice) => report(Err(notice)),
                }
            }
            "pick" => {
                let picked = parse_pick(rest);
                match picked {
                    Some((question, option)) => {
                        let outcome = panel.lock().await.quiz.select_option(question, option);
                        report(outcome);
                        render_panel(&panel).await;
                    }
                    None => println!("! usage: pick <question#> <option#>"),
                }
            }
            "submit" => match quiz::submit_quiz(app.clone(), panel.clone()).await {
                Ok(result) => render_result(&result),
                Err(notice) => report(Err(notice)),
            },
            "reset" => {
                session::reset(&mut *panel.lock().await);
                render_panel(&panel).await;
            }
            "history" => {
                let sessions = history::load_history(&app).await;
                if sessions.is_empty() {
                    println!("No saved sessions yet.");
                }
                for session in sessions {
                    println!(
                        "  [{}] {} ({}) — {} ({} turns)",
                        session.id, session.title, session.content_type, session.preview,
                        session.turn_count
                    );
                }
            }
            "open" => match history::open_session(&app, rest).await {
                Ok(detail) => {
                    println!("Session {}:", detail.session_id);
                    for turn in &detail.turns {
                        println!("  {} {}", speaker_tag(turn.speaker), turn.text);
                    }
                }
                Err(e) => println!("! could not load session: {}", e),
            },
            "show" => render_panel(&panel).await,
            other => println!("! unknown command '{}' — type 'help'", other),
        }
    }

    Ok(())
}

fn panel_for(
    active: ContentType,
    pdf: &Arc<Mutex<PanelState>>,
    video: &Arc<Mutex<PanelState>>,
) -> Arc<Mutex<PanelState>> {
    match active {
        ContentType::Pdf => pdf.clone(),
        ContentType::Video => video.clone(),
    }
}

fn parse_pick(rest: &str) -> Option<(usize, usize)> {
    let mut parts = rest.split_whitespace();
    let question = parts.next()?.parse::<usize>().ok()?.checked_sub(1)?;
    let option = parts.next()?.parse::<usize>().ok()?.checked_sub(1)?;
    Some((question, option))
}

fn report(outcome: Result<(), Notice>) {
    if let Err(notice) = outcome {
        println!("! {}", notice);
    }
}

fn speaker_tag(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "You:",
        Speaker::Ai => "AI: ",
    }
}

async fn render_panel(panel_lock: &Arc<Mutex<PanelState>>) {
    let panel = panel_lock.lock().await;
    println!("--- [{}] ---", panel.content_type);
    match panel.phase {
        ViewPhase::Empty => match &panel.selected_source {
            Some(source) => println!("(upload surface — selected: {})", source),
            None => println!("(upload surface)"),
        },
        ViewPhase::Ingesting => println!("(processing...)"),
        ViewPhase::Ready => {
            if let Some(target) = &panel.viewer_target {
                println!("(viewing: {})", target);
            }
        }
    }
    for entry in panel.transcript.entries() {
        match entry {
            TranscriptEntry::Message(turn) => println!("  {} {}", speaker_tag(turn.speaker), turn.text),
            TranscriptEntry::Typing(_) => println!("  AI:  typing..."),
        }
    }
    match panel.quiz.phase() {
        QuizPhase::Hidden => {}
        QuizPhase::Loading => println!("  [quiz] generating questions..."),
        QuizPhase::Visible => {
            println!("  [quiz]");
            for (i, question) in panel.quiz.questions().iter().enumerate() {
                println!("  {}. {}", i + 1, question.prompt);
                for (j, option) in question.options.iter().enumerate() {
                    let marker = if panel.quiz.selections()[i] == Some(j) { ">" } else { " " };
                    println!("    {}{}) {}", marker, j + 1, option);
                }
            }
        }
    }
}

fn render_result(result: &QuizResult) {
    println!(
        "Quiz complete! Correct answers: {}/{} ({}%)",
        result.correct_count, result.total_questions, result.percentage
    );
    println!("{}", result.tier().message());
}

fn print_help() {
    println!("commands:");
    println!("  tab pdf|video        switch the active panel");
    println!("  pdf <path>           ingest a PDF file");
    println!("  video <url>          ingest a YouTube link");
    println!("  say <message>        ask a question about the loaded content");
    println!("  clear / yes / no     clear the chat (with confirmation)");
    println!("  quiz                 open (generate) or close the quiz panel");
    println!("  pick <q#> <opt#>     select an answer");
    println!("  submit               grade the quiz");
    println!("  reset                discard the panel's content and chat");
    println!("  history              list past sessions");
    println!("  open <session-id>    load a past session");
    println!("  show                 re-render the active panel");
    println!("  quit                 leave");
}
