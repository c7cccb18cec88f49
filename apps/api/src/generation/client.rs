//! Generation Client: one prompt in, one draft plus metrics out.
//!
//! Checks the credential before touching the network, times the backend call,
//! prices it from the reported token usage, and turns every backend failure
//! into `AppError::Generation`. No retries.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, ConfigError};
use crate::llm_client::pricing::calculate_cost;
use crate::llm_client::{CompletionBackend, CompletionRequest, GeminiBackend, LlmConfig, MODEL};

/// A successful generate or refine. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub text: String,
    pub latency_seconds: f64,
    pub estimated_cost_usd: f64,
}

pub struct GenerationClient {
    config: LlmConfig,
    backend: Box<dyn CompletionBackend>,
}

impl GenerationClient {
    /// Production client backed by Gemini.
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        Ok(Self::with_backend(config, Box::new(GeminiBackend::new()?)))
    }

    pub fn with_backend(config: LlmConfig, backend: Box<dyn CompletionBackend>) -> Self {
        Self { config, backend }
    }

    /// Returns the API key, or `MissingCredential` if none is configured.
    pub fn ensure_configured(&self) -> Result<&str, AppError> {
        self.config
            .api_key()
            .ok_or(AppError::Configuration(ConfigError::MissingCredential))
    }

    pub async fn generate(&self, prompt: &str) -> Result<GenerationOutput, AppError> {
        let api_key = self.ensure_configured()?;

        let started = Instant::now();
        let completion = self
            .backend
            .complete(CompletionRequest {
                api_key,
                model: MODEL,
                prompt,
            })
            .await
            .map_err(|e| AppError::Generation(format!("{MODEL} call failed: {e}")))?;
        let latency_seconds = started.elapsed().as_secs_f64();

        let text = completion.text.trim();
        if text.is_empty() {
            return Err(AppError::Generation(format!("{MODEL} returned an empty post")));
        }

        let estimated_cost_usd = calculate_cost(completion.usage);

        info!(
            "Generated {} chars in {:.2}s (prompt_tokens={}, completion_tokens={}, cost=${:.6})",
            text.chars().count(),
            latency_seconds,
            completion.usage.prompt_tokens,
            completion.usage.completion_tokens,
            estimated_cost_usd
        );

        Ok(GenerationOutput {
            text: text.to_string(),
            latency_seconds,
            estimated_cost_usd,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;
    use crate::errors::ErrorKind;
    use crate::llm_client::LlmError;

    fn client(backend: &ScriptedBackend) -> GenerationClient {
        GenerationClient::with_backend(
            LlmConfig::with_api_key("test-key"),
            Box::new(backend.clone()),
        )
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_backend_call() {
        let backend = ScriptedBackend::default().reply("never", 1, 1);
        let client =
            GenerationClient::with_backend(LlmConfig::default(), Box::new(backend.clone()));

        let err = client.generate("prompt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(
            err,
            AppError::Configuration(ConfigError::MissingCredential)
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_reports_text_latency_and_cost() {
        let backend = ScriptedBackend::default().reply("  🚀 Post body  \n", 1_000_000, 0);
        let output = client(&backend).generate("the prompt").await.unwrap();

        assert_eq!(output.text, "🚀 Post body");
        assert!(output.latency_seconds >= 0.0);
        assert_eq!(output.estimated_cost_usd, 0.30);
        assert_eq!(backend.last_prompt().as_deref(), Some("the prompt"));
    }

    #[tokio::test]
    async fn test_zero_usage_costs_nothing() {
        let backend = ScriptedBackend::default().reply("text", 0, 0);
        let output = client(&backend).generate("p").await.unwrap();
        assert_eq!(output.estimated_cost_usd, 0.0);
    }

    #[tokio::test]
    async fn test_blank_completion_is_generation_error() {
        let backend = ScriptedBackend::default().reply(" \n ", 10, 0);
        let err = client(&backend).generate("p").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_generation_error() {
        let backend = ScriptedBackend::default().fail(LlmError::Api {
            status: 429,
            message: "RESOURCE_EXHAUSTED: quota".to_string(),
        });
        let err = client(&backend).generate("p").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Generation);
        assert!(err.to_string().contains("RESOURCE_EXHAUSTED"), "{err}");
        assert_eq!(backend.calls(), 1, "no retries");
    }
}
