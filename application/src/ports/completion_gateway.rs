//! Completion gateway port
//!
//! Defines the interface for the remote text-completion backend. The
//! adapter (infrastructure layer) owns retries, backoff, and the per-model
//! structured-output capability memo; above this port, transient backend
//! failures are invisible unless retries are exhausted.

use async_trait::async_trait;
use coach_domain::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors surfaced by the completion backend.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Rate limited by backend")]
    RateLimited,

    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Client error {status}: {message}")]
    ClientError { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl GatewayError {
    /// Transient failures are retried with backoff inside the adapter;
    /// everything else fails immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::RateLimited | GatewayError::Timeout | GatewayError::Connection(_) => true,
            GatewayError::ServerError { status, .. } => {
                matches!(status, 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

/// Token usage counts reported by the backend for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl TokenUsage {
    pub fn merge(&mut self, other: TokenUsage) {
        self.input += other.input;
        self.output += other.output;
        self.total += other.total;
    }
}

/// One completion request: role-tagged messages plus sampling parameters,
/// tagged with the owning session and a generation name for observability.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub session_id: String,
    /// Caller-supplied name under which token usage is recorded
    /// (e.g. "observer_analysis", "greeting").
    pub generation_name: String,
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(
        session_id: impl Into<String>,
        generation_name: impl Into<String>,
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            generation_name: generation_name.into(),
            model: model.into(),
            messages,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

/// Plain-text completion result.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// Structured completion result: the recovered JSON object plus the raw
/// text it came from (kept for diagnostics and reasoning extraction).
#[derive(Debug, Clone)]
pub struct StructuredCompletion {
    pub payload: Map<String, Value>,
    pub raw: String,
    pub usage: TokenUsage,
}

/// Gateway to the remote text-completion backend.
///
/// `complete_structured` requests the backend's structured-output mode when
/// the model supports it and transparently falls back to plain text plus
/// local extraction when it does not; the per-model capability memo lives
/// in the adapter for the lifetime of the process.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GatewayError>;

    async fn complete_structured(
        &self,
        request: &CompletionRequest,
    ) -> Result<StructuredCompletion, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(GatewayError::RateLimited.is_transient());
        assert!(GatewayError::Timeout.is_transient());
        assert!(
            GatewayError::ServerError {
                status: 503,
                message: "overloaded".to_string()
            }
            .is_transient()
        );
        assert!(
            !GatewayError::ClientError {
                status: 400,
                message: "bad request".to_string()
            }
            .is_transient()
        );
        assert!(!GatewayError::InvalidResponse("garbage".to_string()).is_transient());
    }

    #[test]
    fn usage_merge_accumulates() {
        let mut total = TokenUsage::default();
        total.merge(TokenUsage {
            input: 10,
            output: 5,
            total: 15,
        });
        total.merge(TokenUsage {
            input: 1,
            output: 2,
            total: 3,
        });
        assert_eq!(total.total, 18);
        assert_eq!(total.input, 11);
    }
}
