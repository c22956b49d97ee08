//! HTTP adapter for an OpenAI-compatible completion proxy.
//!
//! Talks to `/v1/chat/completions`. Owns the retry policy for transient
//! failures (exponential backoff, 500ms base, 30s ceiling) and the
//! per-model JSON-mode capability memo: the first 400 complaining about
//! `response_format` marks the model as unsupported for the rest of the
//! process, and structured requests fall back to plain text plus local
//! payload extraction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use coach_application::{
    Completion, CompletionGateway, CompletionRequest, GatewayError, InterviewTracker,
    StructuredCompletion, TokenUsage,
};
use coach_domain::{extract_json_payload, Message};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::FileLlmConfig;

const BACKOFF_BASE_MS: u64 = 500;
const BACKOFF_CEILING_MS: u64 = 30_000;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

impl From<ChatUsage> for TokenUsage {
    fn from(usage: ChatUsage) -> Self {
        TokenUsage {
            input: usage.prompt_tokens,
            output: usage.completion_tokens,
            total: usage.total_tokens,
        }
    }
}

pub struct LiteLlmGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retries: u32,
    tracker: Arc<dyn InterviewTracker>,
    /// Per-model JSON-mode support, learned at runtime.
    json_mode_support: Mutex<HashMap<String, bool>>,
}

impl LiteLlmGateway {
    pub fn new(
        config: &FileLlmConfig,
        tracker: Arc<dyn InterviewTracker>,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retries: config.retries,
            tracker,
            json_mode_support: Mutex::new(HashMap::new()),
        })
    }

    fn model_supports_json_mode(&self, model: &str) -> bool {
        self.json_mode_support
            .lock()
            .map(|memo| memo.get(model).copied().unwrap_or(true))
            .unwrap_or(true)
    }

    fn mark_json_mode_unsupported(&self, model: &str) {
        if let Ok(mut memo) = self.json_mode_support.lock() {
            memo.insert(model.to_string(), false);
        }
    }

    /// One HTTP round trip, no retries.
    async fn send_once(
        &self,
        request: &CompletionRequest,
        json_mode: bool,
    ) -> Result<(String, TokenUsage), GatewayError> {
        let mut body = json!({
            "model": request.model,
            "messages": wire_messages(&request.messages),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let mut http = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(map_status_error(status.as_u16(), message));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let usage = chat.usage.map(TokenUsage::from).unwrap_or_default();
        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GatewayError::InvalidResponse("no completion choices".to_string()))?;

        self.tracker
            .record_generation(&request.session_id, &request.generation_name, usage);
        Ok((text, usage))
    }

    /// Retrying wrapper: transient failures back off and retry, everything
    /// else surfaces immediately.
    async fn send_with_retries(
        &self,
        request: &CompletionRequest,
        json_mode: bool,
    ) -> Result<(String, TokenUsage), GatewayError> {
        let attempts = self.retries + 1;
        let mut last_error = String::new();
        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = backoff_delay(attempt - 1);
                debug!(
                    generation = %request.generation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying completion after transient failure"
                );
                tokio::time::sleep(delay).await;
            }
            match self.send_once(request, json_mode).await {
                Ok(result) => return Ok(result),
                Err(err) if err.is_transient() => {
                    warn!(generation = %request.generation_name, error = %err, "transient backend failure");
                    last_error = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }
        Err(GatewayError::RetriesExhausted {
            attempts,
            last_error,
        })
    }
}

#[async_trait]
impl CompletionGateway for LiteLlmGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GatewayError> {
        let (text, usage) = self.send_with_retries(request, false).await?;
        Ok(Completion { text, usage })
    }

    async fn complete_structured(
        &self,
        request: &CompletionRequest,
    ) -> Result<StructuredCompletion, GatewayError> {
        let json_mode = self.model_supports_json_mode(&request.model);
        let result = self.send_with_retries(request, json_mode).await;

        let (raw, usage) = match result {
            Ok(result) => result,
            // A 400 naming response_format means the model cannot do JSON
            // mode; remember that and fall back to plain text.
            Err(GatewayError::ClientError { status: 400, message })
                if json_mode && message.contains("response_format") =>
            {
                warn!(model = %request.model, "model rejected JSON mode, falling back to text");
                self.mark_json_mode_unsupported(&request.model);
                self.send_with_retries(request, false).await?
            }
            Err(err) => return Err(err),
        };

        let payload = extract_json_payload(&raw)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(StructuredCompletion {
            payload,
            raw,
            usage,
        })
    }
}

fn wire_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect()
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Connection(err.to_string())
    }
}

fn map_status_error(status: u16, message: String) -> GatewayError {
    match status {
        429 => GatewayError::RateLimited,
        500..=599 => GatewayError::ServerError { status, message },
        _ => GatewayError::ClientError { status, message },
    }
}

/// Exponential backoff: 500ms doubling per retry, capped at 30s.
fn backoff_delay(retry: u32) -> Duration {
    let ms = BACKOFF_BASE_MS.saturating_mul(1u64 << retry.min(10));
    Duration::from_millis(ms.min(BACKOFF_CEILING_MS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_application::NoInterviewTracker;

    fn gateway() -> LiteLlmGateway {
        LiteLlmGateway::new(&FileLlmConfig::default(), Arc::new(NoInterviewTracker)).unwrap()
    }

    #[test]
    fn backoff_schedule_doubles_to_the_ceiling() {
        assert_eq!(backoff_delay(0), Duration::from_millis(500));
        assert_eq!(backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(backoff_delay(6), Duration::from_millis(30_000));
        assert_eq!(backoff_delay(30), Duration::from_millis(30_000));
    }

    #[test]
    fn status_mapping_matches_retry_policy() {
        assert!(map_status_error(429, String::new()).is_transient());
        assert!(map_status_error(503, String::new()).is_transient());
        assert!(!map_status_error(400, String::new()).is_transient());
        assert!(!map_status_error(404, String::new()).is_transient());
    }

    #[test]
    fn json_mode_memo_defaults_to_supported() {
        let gateway = gateway();
        assert!(gateway.model_supports_json_mode("gpt-4o-mini"));
        gateway.mark_json_mode_unsupported("gpt-4o-mini");
        assert!(!gateway.model_supports_json_mode("gpt-4o-mini"));
        assert!(gateway.model_supports_json_mode("gpt-4o"));
    }

    #[test]
    fn chat_response_deserializes_with_usage() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": "hi"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            }"#,
        )
        .unwrap();
        assert_eq!(chat.choices[0].message.content.as_deref(), Some("hi"));
        let usage: TokenUsage = chat.usage.unwrap().into();
        assert_eq!(usage.total, 15);
    }

    #[test]
    fn wire_messages_tag_roles() {
        let messages = vec![Message::system("s"), Message::user("u")];
        let wire = wire_messages(&messages);
        assert_eq!(wire[0]["role"], "system");
        assert_eq!(wire[1]["content"], "u");
    }
}
