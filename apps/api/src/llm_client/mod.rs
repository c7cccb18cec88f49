/// LLM Client: the single point of entry for all text-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All backend traffic goes through a `CompletionBackend`; production uses
/// `GeminiBackend`, tests substitute their own.
///
/// Model: gemini-2.5-flash (hardcoded; the rate table in `pricing` is tied to it)
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod pricing;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// The model used for every generate and refine call.
pub const MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Prompt was blocked by the backend: {0}")]
    Blocked(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Backend credentials, injected into the generation client at construction.
#[derive(Clone, Default)]
pub struct LlmConfig {
    api_key: Option<String>,
}

impl LlmConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(Some(api_key.into()))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Token counts reported by the backend. Missing counts are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// One single-shot completion: the prompt is the entire input, no chat history.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub api_key: &'a str,
    pub model: &'a str,
    pub prompt: &'a str,
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: UsageMetadata,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Production backend: Gemini `generateContent` over REST.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
}

impl GeminiBackend {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_base_url(GEMINI_API_BASE)
    }

    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint(request.model))
            .header("x-goog-api-key", request.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let completion = parse_completion(&text)?;

        debug!(
            "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
            completion.usage.prompt_tokens, completion.usage.completion_tokens
        );

        Ok(completion)
    }
}

/// Extracts the joined candidate text and usage counts from a success body.
fn parse_completion(body: &str) -> Result<Completion, LlmError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LlmError::Blocked(reason));
        }
        return Err(LlmError::EmptyContent);
    }

    Ok(Completion {
        text,
        usage: TokenUsage {
            prompt_tokens: parsed.usage_metadata.prompt_token_count,
            completion_tokens: parsed.usage_metadata.candidates_token_count,
        },
    })
}

/// Pulls `STATUS: message` out of a Gemini error body, or returns the raw body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<GeminiError>(body) {
        Ok(GeminiError { error }) => match (error.status, error.message) {
            (Some(status), Some(message)) => format!("{status}: {message}"),
            (None, Some(message)) => message,
            (Some(status), None) => status,
            (None, None) => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_completion_joins_parts_and_reads_usage() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hook 🚀\n"}, {"text": "Body"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 1200, "candidatesTokenCount": 300, "totalTokenCount": 1500}
        }"#;
        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.text, "Hook 🚀\nBody");
        assert_eq!(
            completion.usage,
            TokenUsage {
                prompt_tokens: 1200,
                completion_tokens: 300
            }
        );
    }

    #[test]
    fn test_parse_completion_missing_usage_counts_as_zero() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "ok"}]}}]}"#;
        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.usage, TokenUsage::default());

        let body = r#"{
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}],
            "usageMetadata": {"promptTokenCount": 7}
        }"#;
        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.usage.prompt_tokens, 7);
        assert_eq!(completion.usage.completion_tokens, 0);
    }

    #[test]
    fn test_parse_completion_blocked_prompt() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert!(matches!(
            parse_completion(body),
            Err(LlmError::Blocked(reason)) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_parse_completion_empty_candidates() {
        assert!(matches!(
            parse_completion(r#"{"candidates": []}"#),
            Err(LlmError::EmptyContent)
        ));
    }

    #[test]
    fn test_parse_completion_malformed_json() {
        assert!(matches!(
            parse_completion("<html>502</html>"),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_api_error_message_formats() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(
            api_error_message(body),
            "INVALID_ARGUMENT: API key not valid."
        );
        assert_eq!(api_error_message("upstream down"), "upstream down");
    }

    #[test]
    fn test_endpoint_includes_model() {
        let backend = GeminiBackend::with_base_url("https://example.test/v1beta/").unwrap();
        assert_eq!(
            backend.endpoint(MODEL),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_llm_config_debug_redacts_key() {
        let config = LlmConfig::with_api_key("secret-key-123");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key-123"));
        assert!(debug.contains("redacted"));
        assert_eq!(config.api_key(), Some("secret-key-123"));
    }

    fn request<'a>(prompt: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            api_key: "test-key",
            model: MODEL,
            prompt,
        }
    }

    #[tokio::test]
    async fn test_gemini_backend_sends_key_and_prompt() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Write a post"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{"content": {"parts": [{"text": "🚀 Ship it"}]}}],
                    "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let backend = GeminiBackend::with_base_url(&server.url()).unwrap();
        let completion = backend.complete(request("Write a post")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(completion.text, "🚀 Ship it");
        assert_eq!(
            completion.usage,
            TokenUsage {
                prompt_tokens: 12,
                completion_tokens: 4
            }
        );
    }

    #[tokio::test]
    async fn test_gemini_error_body_becomes_api_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "error": {
                        "code": 429,
                        "message": "Quota exceeded",
                        "status": "RESOURCE_EXHAUSTED"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let backend = GeminiBackend::with_base_url(&server.url()).unwrap();
        let err = backend.complete(request("p")).await.unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
