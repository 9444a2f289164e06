//! Groq chat-completions client.
//!
//! Speaks the OpenAI-compatible wire format: a fixed system instruction
//! plus one user message carrying the composed prompt.  Model and
//! credential are fixed at construction, never per-request.
//!
//! Every request carries an explicit deadline so a hung upstream cannot
//! hang the chat request forever.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionClient, CompletionError};

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const SYSTEM_INSTRUCTION: &str = "You are a helpful study assistant.";

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
}

/// Production [`CompletionClient`] backed by the Groq REST API.
#[derive(Debug, Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl GroqClient {
    /// Build a client with a fixed model and credential.
    ///
    /// The credential is not checked here; an empty or invalid key surfaces
    /// as a [`CompletionError::Status`] on first use.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: GROQ_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn send(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = WireRequest {
            model: self.model.clone(),
            messages: vec![
                WireMessage {
                    role: "system".into(),
                    content: SYSTEM_INSTRUCTION.into(),
                },
                WireMessage {
                    role: "user".into(),
                    content: prompt.to_owned(),
                },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let parsed: WireResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(CompletionError::NoChoices)
    }
}

#[async_trait::async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "completion request");
        match tokio::time::timeout(self.timeout, self.send(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wire_request_carries_system_instruction_first() {
        let body = WireRequest {
            model: "llama-3.1-8b-instant".into(),
            messages: vec![
                WireMessage {
                    role: "system".into(),
                    content: SYSTEM_INSTRUCTION.into(),
                },
                WireMessage {
                    role: "user".into(),
                    content: "hello".into(),
                },
            ],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], SYSTEM_INSTRUCTION);
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn wire_response_parses_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"4"}}]}"#;
        let parsed: WireResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "4");
    }

    #[tokio::test]
    async fn timeout_is_reported_as_completion_error() {
        // A local listener that accepts and never answers makes the call
        // hang deterministically.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _conn = listener.accept().await;
            std::future::pending::<()>().await;
        });

        let client = GroqClient {
            endpoint: format!("http://{addr}/openai/v1/chat/completions"),
            timeout: Duration::from_millis(50),
            ..GroqClient::new("key", "model", 1)
        };
        let err = client.complete("hi").await.unwrap_err();
        assert!(matches!(err, CompletionError::Timeout { .. }));
    }
}
