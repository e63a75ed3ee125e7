pub mod domain;
pub mod ports;

pub use domain::{
    ContentContext, ContentType, FeedbackTier, Notice, QuizQuestion, QuizResult, SessionDetail,
    SessionSummary, Speaker, Turn,
};
pub use ports::{
    AnswerRecord, ChatTurnReply, ChatTurnRequest, DocumentIngest, PortError, PortResult,
    QuizResultRecord, TransportService, VideoIngest,
};
