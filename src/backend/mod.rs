use crate::event::AppEvent;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::mpsc;
use thiserror::Error;
use tokio::runtime::Handle;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Every way a round trip can fail. Callers collapse all variants into the
/// same user-visible fallback; the distinction only reaches the log.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("tokio runtime unavailable: {0}")]
    RuntimeUnavailable(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Body of a successful `POST /chat`. Only `reply` is guaranteed; the server
/// may omit the session id and the mode.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    mode: String,
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

fn chat_form(message: &str, session_id: Option<&str>) -> Vec<(&'static str, String)> {
    let mut form = vec![("message", message.to_string())];
    if let Some(session_id) = session_id {
        form.push(("session_id", session_id.to_string()));
    }
    form
}

fn clear_form(session_id: Option<&str>) -> Vec<(&'static str, String)> {
    session_id
        .map(|session_id| vec![("session_id", session_id.to_string())])
        .unwrap_or_default()
}

/// Thin client for the three backend endpoints. Each call is a single round
/// trip on the tokio runtime; the outcome comes back to the UI loop as an
/// [`AppEvent`]. No retry, no backoff, no cancellation.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, BackendError> {
        let runtime_handle = Handle::try_current()
            .map_err(|err| BackendError::RuntimeUnavailable(err.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            tx,
            runtime_handle,
        })
    }

    pub fn send_message(&self, message: String, session_id: Option<String>) {
        let url = endpoint(&self.base_url, "chat");
        let http = self.http.clone();
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            let event = match post_chat(&http, &url, &message, session_id.as_deref()).await {
                Ok(reply) => AppEvent::ReplyArrived {
                    reply: reply.reply,
                    session_id: reply.session_id,
                    mode: reply.mode,
                },
                Err(err) => AppEvent::SendFailed(err.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    pub fn probe_status(&self) {
        let url = endpoint(&self.base_url, "status");
        let http = self.http.clone();
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            let event = match get_status(&http, &url).await {
                Ok(mode) => AppEvent::StatusProbed(mode),
                Err(err) => AppEvent::StatusProbeFailed(err.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    pub fn clear_session(&self, session_id: Option<String>) {
        let url = endpoint(&self.base_url, "reset");
        let http = self.http.clone();
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            let event = match post_clear(&http, &url, session_id.as_deref()).await {
                Ok(()) => AppEvent::SessionCleared,
                Err(err) => AppEvent::SessionClearFailed(err.to_string()),
            };
            let _ = tx.send(event);
        });
    }
}

async fn post_chat(
    http: &reqwest::Client,
    url: &str,
    message: &str,
    session_id: Option<&str>,
) -> Result<ChatReply, BackendError> {
    let response = http
        .post(url)
        .form(&chat_form(message, session_id))
        .send()
        .await
        .map_err(|source| BackendError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::Status {
            url: url.to_string(),
            status,
        });
    }

    response
        .json::<ChatReply>()
        .await
        .map_err(|source| BackendError::Decode {
            url: url.to_string(),
            source,
        })
}

async fn get_status(http: &reqwest::Client, url: &str) -> Result<String, BackendError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|source| BackendError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response
        .json::<StatusBody>()
        .await
        .map_err(|source| BackendError::Decode {
            url: url.to_string(),
            source,
        })?;
    Ok(body.mode)
}

async fn post_clear(
    http: &reqwest::Client,
    url: &str,
    session_id: Option<&str>,
) -> Result<(), BackendError> {
    let response = http
        .post(url)
        .form(&clear_form(session_id))
        .send()
        .await
        .map_err(|source| BackendError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::Status {
            url: url.to_string(),
            status,
        });
    }

    // Response body is implementation-defined and ignored.
    Ok(())
}
