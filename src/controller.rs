use crate::event::AppEvent;
use crate::session::SessionStore;
use crate::status::{ConnectionMode, StatusIndicator};
use crate::transcript::{Bubble, BubbleId, Role, Transcript};

pub const GREETING: &str =
    "Hi! I'm your assistant. Ask me anything, or pick a suggestion to get started.";
pub const SEND_FAILED_REPLY: &str =
    "Something went wrong. Please try again or check the server logs.";

const TYPING_PLACEHOLDER: &str = "Typing…";
const LABEL_CONNECTED: &str = "Connected";
const LABEL_OFFLINE: &str = "Offline";

/// A `/chat` request the UI shell should hand to the backend client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundChat {
    pub message: String,
    pub session_id: Option<String>,
}

/// A `/reset` request for the server-side half of a conversation reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundClear {
    pub session_id: String,
}

/// Orchestrates transcript, status, and session store around the two-state
/// send cycle (idle / sending). Owns the in-flight flag: at most one chat
/// request exists at a time. Network dispatch is command-out — `submit` and
/// `reset_conversation` describe the request and the caller performs it —
/// which keeps this type free of any UI or HTTP machinery.
pub struct ChatController {
    store: SessionStore,
    transcript: Transcript,
    status: StatusIndicator,
    sending: bool,
    typing_bubble: Option<BubbleId>,
}

impl ChatController {
    pub fn new(store: SessionStore) -> Self {
        let mut transcript = Transcript::default();
        transcript.append(Role::Assistant, GREETING);

        Self {
            store,
            transcript,
            status: StatusIndicator::new("Connecting…", ConnectionMode::Offline),
            sending: false,
            typing_bubble: None,
        }
    }

    pub fn bubbles(&self) -> &[Bubble] {
        self.transcript.bubbles()
    }

    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// True until the first user message lands, i.e. while the transcript
    /// holds nothing but the greeting. Drives the suggestion chips.
    pub fn is_fresh(&self) -> bool {
        self.transcript.bubbles().len() <= 1
    }

    /// Starts a send if the composer is idle and the trimmed text is
    /// non-empty. The user bubble and the typing placeholder are appended
    /// before the request description is returned.
    pub fn submit(&mut self, raw: &str) -> Option<OutboundChat> {
        if self.sending {
            return None;
        }

        let message = raw.trim();
        if message.is_empty() {
            return None;
        }

        self.transcript.append(Role::User, message);
        self.typing_bubble = Some(self.transcript.append(Role::Typing, TYPING_PLACEHOLDER));
        self.sending = true;

        Some(OutboundChat {
            message: message.to_string(),
            session_id: self.store.get(),
        })
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ReplyArrived {
                reply,
                session_id,
                mode,
            } => {
                self.remove_typing_placeholder();
                self.transcript.append(Role::Assistant, reply);
                if let Some(session_id) = session_id {
                    if let Err(err) = self.store.set(&session_id) {
                        log::warn!("failed to persist session id: {err}");
                    }
                }
                self.apply_mode(mode.as_deref());
                self.sending = false;
            }
            AppEvent::SendFailed(detail) => {
                log::warn!("chat request failed: {detail}");
                self.remove_typing_placeholder();
                self.transcript.append(Role::Assistant, SEND_FAILED_REPLY);
                self.status.set(LABEL_OFFLINE, ConnectionMode::Offline);
                self.sending = false;
            }
            AppEvent::StatusProbed(mode) => {
                self.apply_mode(Some(&mode));
            }
            AppEvent::StatusProbeFailed(detail) => {
                log::warn!("status probe failed: {detail}");
                self.status.set(LABEL_OFFLINE, ConnectionMode::Offline);
            }
            AppEvent::SessionCleared => {
                log::info!("backend acknowledged session clear");
            }
            AppEvent::SessionClearFailed(detail) => {
                // Best-effort: the local reset has already happened.
                log::warn!("server-side session clear failed: {detail}");
            }
        }
    }

    /// Linear best-effort reset. The server-side clear is requested only when
    /// a session id is stored; the local state is reset unconditionally.
    pub fn reset_conversation(&mut self) -> Option<OutboundClear> {
        let request = self
            .store
            .get()
            .map(|session_id| OutboundClear { session_id });

        if let Err(err) = self.store.clear() {
            log::warn!("failed to clear stored session id: {err}");
        }

        self.transcript.clear();
        self.transcript.append(Role::Assistant, GREETING);
        self.status.set(LABEL_OFFLINE, ConnectionMode::Offline);
        self.sending = false;
        self.typing_bubble = None;

        request
    }

    fn apply_mode(&mut self, mode: Option<&str>) {
        match mode.map(ConnectionMode::from_wire).unwrap_or(ConnectionMode::Offline) {
            ConnectionMode::Online => self.status.set(LABEL_CONNECTED, ConnectionMode::Online),
            ConnectionMode::Offline => self.status.set(LABEL_OFFLINE, ConnectionMode::Offline),
        }
    }

    fn remove_typing_placeholder(&mut self) {
        if let Some(id) = self.typing_bubble.take() {
            self.transcript.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatController, OutboundChat, OutboundClear, GREETING, SEND_FAILED_REPLY};
    use crate::event::AppEvent;
    use crate::session::SessionStore;
    use crate::status::ConnectionMode;
    use crate::transcript::Role;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_store(prefix: &str) -> SessionStore {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        SessionStore::at(std::env::temp_dir().join(format!(
            "parley_controller_{prefix}_{}_{}.json",
            std::process::id(),
            nanos
        )))
    }

    fn reply(reply: &str, session_id: Option<&str>, mode: Option<&str>) -> AppEvent {
        AppEvent::ReplyArrived {
            reply: reply.to_string(),
            session_id: session_id.map(str::to_string),
            mode: mode.map(str::to_string),
        }
    }

    #[test]
    fn new_controller_shows_only_the_greeting() {
        let controller = ChatController::new(temp_store("greeting"));

        let bubbles = controller.bubbles();
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles[0].role, Role::Assistant);
        assert_eq!(bubbles[0].text, GREETING);
        assert!(!controller.is_sending());
    }

    #[test]
    fn submit_appends_user_bubble_and_returns_the_request() {
        let mut controller = ChatController::new(temp_store("submit"));

        let outbound = controller
            .submit("  Hello  ")
            .expect("non-empty input should start a send");

        assert_eq!(
            outbound,
            OutboundChat {
                message: "Hello".to_string(),
                session_id: None,
            }
        );
        let bubbles = controller.bubbles();
        assert_eq!(bubbles[1].role, Role::User);
        assert_eq!(bubbles[1].text, "Hello");
        assert_eq!(bubbles[2].role, Role::Typing);
        assert!(controller.is_sending());
    }

    #[test]
    fn submit_ignores_whitespace_only_input() {
        let mut controller = ChatController::new(temp_store("whitespace"));

        assert_eq!(controller.submit("   \n\t "), None);
        assert_eq!(controller.bubbles().len(), 1);
        assert!(!controller.is_sending());
    }

    #[test]
    fn submit_is_suppressed_while_a_send_is_outstanding() {
        let mut controller = ChatController::new(temp_store("reentrancy"));

        assert!(controller.submit("first").is_some());
        assert_eq!(controller.submit("second"), None);

        let user_bubbles = controller
            .bubbles()
            .iter()
            .filter(|bubble| bubble.role == Role::User)
            .count();
        assert_eq!(user_bubbles, 1);
    }

    #[test]
    fn submit_includes_the_stored_session_id() {
        let store = temp_store("stored_id");
        store.set("abc123").expect("session id should persist");
        let mut controller = ChatController::new(store.clone());

        let outbound = controller.submit("Hello").expect("send should start");
        assert_eq!(outbound.session_id.as_deref(), Some("abc123"));
        let _ = store.clear();
    }

    #[test]
    fn reply_updates_transcript_store_and_status() {
        let store = temp_store("reply");
        let mut controller = ChatController::new(store.clone());
        controller.submit("Hello").expect("send should start");

        controller.apply_event(reply("Hi there", Some("abc123"), Some("online")));

        let bubbles = controller.bubbles();
        assert_eq!(bubbles.len(), 3);
        assert_eq!(bubbles[1].text, "Hello");
        assert_eq!(bubbles[2].role, Role::Assistant);
        assert_eq!(bubbles[2].text, "Hi there");
        assert_eq!(store.get().as_deref(), Some("abc123"));
        assert_eq!(controller.status().mode(), ConnectionMode::Online);
        assert!(!controller.is_sending());
        let _ = store.clear();
    }

    #[test]
    fn reply_without_session_id_keeps_the_stored_value() {
        let store = temp_store("keep_id");
        store.set("abc123").expect("session id should persist");
        let mut controller = ChatController::new(store.clone());
        controller.submit("Hello").expect("send should start");

        controller.apply_event(reply("Hi", None, Some("online")));

        assert_eq!(store.get().as_deref(), Some("abc123"));
        let _ = store.clear();
    }

    #[test]
    fn reply_with_unrecognized_mode_marks_offline() {
        let mut controller = ChatController::new(temp_store("odd_mode"));
        controller.submit("Hello").expect("send should start");

        controller.apply_event(reply("Hi", None, Some("degraded")));
        assert_eq!(controller.status().mode(), ConnectionMode::Offline);

        controller.submit("again").expect("send should start");
        controller.apply_event(reply("Hi", None, None));
        assert_eq!(controller.status().mode(), ConnectionMode::Offline);
    }

    #[test]
    fn failure_appends_the_fixed_error_reply_and_marks_offline() {
        let mut controller = ChatController::new(temp_store("failure"));
        controller.submit("test").expect("send should start");

        controller.apply_event(AppEvent::SendFailed("connection refused".to_string()));

        let bubbles = controller.bubbles();
        assert_eq!(bubbles.len(), 3);
        assert_eq!(bubbles[1].text, "test");
        assert_eq!(bubbles[2].role, Role::Assistant);
        assert_eq!(bubbles[2].text, SEND_FAILED_REPLY);
        assert_eq!(controller.status().mode(), ConnectionMode::Offline);
        assert!(!controller.is_sending());
    }

    #[test]
    fn typing_placeholder_lives_only_while_sending() {
        let mut controller = ChatController::new(temp_store("typing"));
        controller.submit("Hello").expect("send should start");

        assert!(controller
            .bubbles()
            .iter()
            .any(|bubble| bubble.role == Role::Typing));

        controller.apply_event(reply("Hi", None, Some("online")));

        assert!(controller
            .bubbles()
            .iter()
            .all(|bubble| bubble.role != Role::Typing));
    }

    #[test]
    fn status_probe_updates_the_indicator() {
        let mut controller = ChatController::new(temp_store("probe"));

        controller.apply_event(AppEvent::StatusProbed("online".to_string()));
        assert_eq!(controller.status().mode(), ConnectionMode::Online);
        assert_eq!(controller.status().label(), "Connected");

        controller.apply_event(AppEvent::StatusProbeFailed("timed out".to_string()));
        assert_eq!(controller.status().mode(), ConnectionMode::Offline);
    }

    #[test]
    fn reset_clears_the_store_and_restores_the_greeting() {
        let store = temp_store("reset");
        store.set("abc123").expect("session id should persist");
        let mut controller = ChatController::new(store.clone());
        controller.submit("Hello").expect("send should start");
        controller.apply_event(reply("Hi", None, Some("online")));

        let request = controller.reset_conversation();

        assert_eq!(
            request,
            Some(OutboundClear {
                session_id: "abc123".to_string(),
            })
        );
        assert_eq!(store.get(), None);
        let bubbles = controller.bubbles();
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles[0].role, Role::Assistant);
        assert_eq!(bubbles[0].text, GREETING);
        assert_eq!(controller.status().mode(), ConnectionMode::Offline);
    }

    #[test]
    fn reset_without_a_stored_session_skips_the_server_call() {
        let mut controller = ChatController::new(temp_store("reset_no_id"));

        assert_eq!(controller.reset_conversation(), None);
        assert_eq!(controller.bubbles().len(), 1);
    }

    #[test]
    fn reset_reenables_the_composer() {
        let mut controller = ChatController::new(temp_store("reset_sending"));
        controller.submit("Hello").expect("send should start");

        controller.reset_conversation();

        assert!(!controller.is_sending());
        assert!(controller.submit("again").is_some());
    }
}
