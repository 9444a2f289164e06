//! Outbound completion client.
//!
//! [`CompletionClient`] is the seam between the chat endpoint and the
//! hosted model: production uses [`groq::GroqClient`], tests use stubs.
//! There is no retry, fallback model, or partial answer — any failure here
//! propagates to the endpoint as a request-level error.

pub mod groq;

use thiserror::Error;

/// Failure modes of one completion round-trip.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The HTTP request could not be sent or the response body not read.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status (auth, quota, …).
    #[error("completion service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response parsed but contained no generated choice.
    #[error("completion response contained no choices")]
    NoChoices,

    /// The call exceeded the configured deadline.
    #[error("completion timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// One call-and-response cycle with the external text-generation service.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync + 'static {
    /// Send `prompt` as the human turn and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
