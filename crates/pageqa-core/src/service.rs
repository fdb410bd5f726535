use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resource path of the question endpoint, appended to the base address.
pub const CHATBOT_PATH: &str = "/chatbot";

pub const UNREACHABLE_MESSAGE: &str =
    "Unable to connect to the server. Please make sure the backend is running.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred while processing your request. Please try again.";

#[derive(Serialize)]
struct ChatbotRequest<'a> {
    url: &'a str,
    question: &'a str,
}

#[derive(Deserialize)]
struct ChatbotResponse {
    answer: Option<String>,
    error: Option<String>,
}

impl ChatbotResponse {
    /// The backend's error text, ignoring empty strings.
    fn error_text(&self) -> Option<&str> {
        self.error.as_deref().filter(|text| !text.is_empty())
    }
}

/// How a question request settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QaOutcome {
    Answer(String),
    /// The backend answered but reported that it could not process the query.
    Remote(String),
    Transport(TransportError),
}

/// Failures where no usable backend response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{}", UNREACHABLE_MESSAGE)]
    NetworkUnreachable,
    /// Carries the most specific diagnostic available, if any.
    #[error("{}", describe_other(.0))]
    Other(Option<String>),
}

fn describe_other(detail: &Option<String>) -> &str {
    detail.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE)
}

/// The remote Q&A backend as seen by the dispatcher.
#[async_trait]
pub trait QaService: Send + Sync {
    /// Ask one question about `url`. Never fails; every failure is folded
    /// into the returned outcome.
    async fn ask(&self, url: &str, question: &str) -> QaOutcome;

    /// Whether the backend answers at all.
    async fn ping(&self) -> bool;
}

#[derive(Clone)]
pub struct QaClient {
    client: Client,
    base_url: String,
}

impl QaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CHATBOT_PATH)
    }
}

#[async_trait]
impl QaService for QaClient {
    async fn ask(&self, url: &str, question: &str) -> QaOutcome {
        let request = ChatbotRequest { url, question };

        let response = match self.client.post(self.endpoint()).json(&request).send().await {
            Ok(response) => response,
            Err(err) => {
                log::warn!("question request failed before a response: {err}");
                return QaOutcome::Transport(classify_send_error(&err));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                log::warn!("failed to read response body (status {status}): {err}");
                return QaOutcome::Transport(TransportError::Other(None));
            }
        };
        let parsed: Option<ChatbotResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            log::warn!("backend returned status {status}");
            let detail = parsed
                .as_ref()
                .and_then(ChatbotResponse::error_text)
                .map(str::to_string);
            return QaOutcome::Transport(TransportError::Other(detail));
        }

        let Some(parsed) = parsed else {
            log::warn!("backend returned a body that is not a chatbot response");
            return QaOutcome::Transport(TransportError::Other(None));
        };

        if let Some(error) = parsed.error_text() {
            return QaOutcome::Remote(error.to_string());
        }

        match parsed.answer {
            Some(answer) => QaOutcome::Answer(answer),
            None => {
                log::warn!("backend response carried neither answer nor error");
                QaOutcome::Transport(TransportError::Other(None))
            }
        }
    }

    async fn ping(&self) -> bool {
        let url = format!("{}/", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                log::info!("health check of {url} failed: {err}");
                false
            }
        }
    }
}

fn classify_send_error(err: &reqwest::Error) -> TransportError {
    if err.is_connect() || err.is_timeout() {
        TransportError::NetworkUnreachable
    } else {
        TransportError::Other(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = QaClient::new("http://localhost:5001/");
        assert_eq!(client.base_url(), "http://localhost:5001");
        assert_eq!(client.endpoint(), "http://localhost:5001/chatbot");
    }

    #[test]
    fn test_transport_error_messages() {
        assert_eq!(TransportError::NetworkUnreachable.to_string(), UNREACHABLE_MESSAGE);
        assert_eq!(TransportError::Other(None).to_string(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(
            TransportError::Other(Some("URL and question are required".into())).to_string(),
            "URL and question are required"
        );
    }

    #[test]
    fn test_empty_error_field_is_ignored() {
        let parsed: ChatbotResponse =
            serde_json::from_str(r#"{"error": "", "answer": "ok"}"#).unwrap();
        assert_eq!(parsed.error_text(), None);
    }
}
