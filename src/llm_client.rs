//! Text-generation API client for OpenAI and Anthropic.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
        }
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the max tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Generates a completion from a system prompt and user message.
    #[instrument(
        skip(self, system_prompt, user_message),
        fields(provider = ?self.config.provider, model = %self.config.model)
    )]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        debug!("Generating completion");
        let content = match self.config.provider {
            LlmProvider::OpenAI => self.generate_openai(system_prompt, user_message).await?,
            LlmProvider::Anthropic => self.generate_anthropic(system_prompt, user_message).await?,
        };
        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    #[instrument(skip(self, system_prompt, user_message))]
    async fn generate_anthropic(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system_prompt,
            "messages": [{ "role": "user", "content": user_message }]
        });

        let request = self
            .http
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        let json = self.send(request, "Anthropic").await?;

        json["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LlmError::new("No text content in Anthropic response".to_string()))
    }

    #[instrument(skip(self, system_prompt, user_message))]
    async fn generate_openai(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ]
        });

        let request = self
            .http
            .post(OPENAI_URL)
            .bearer_auth(&self.config.api_key)
            .json(&body);
        let json = self.send(request, "OpenAI").await?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LlmError::new("No content in OpenAI response".to_string()))
    }

    /// Sends a request and returns the parsed JSON body of a successful response.
    #[instrument(skip(self, request))]
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        vendor: &'static str,
    ) -> Result<serde_json::Value, LlmError> {
        debug!("Sending request");
        let response = request.send().await.map_err(|e| {
            error!(error = ?e, "API request failed");
            LlmError::new(format!("{} API request failed: {}", vendor, e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::new(format!("Failed to read {} response: {}", vendor, e)))?;

        if !status.is_success() {
            error!(status = %status, response = %text, "API error");
            return Err(LlmError::new(format!("{} API error {}: {}", vendor, status, text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| LlmError::new(format!("Failed to parse {} response: {}", vendor, e)))
    }
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
