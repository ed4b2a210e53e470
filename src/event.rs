/// Events flowing from the backend tasks to the UI loop. Failure payloads
/// carry the diagnostic detail for the log; the transcript only ever shows
/// the fixed fallback text.
#[derive(Debug, Clone)]
pub enum AppEvent {
    ReplyArrived {
        reply: String,
        session_id: Option<String>,
        mode: Option<String>,
    },
    SendFailed(String),
    StatusProbed(String),
    StatusProbeFailed(String),
    SessionCleared,
    SessionClearFailed(String),
}
