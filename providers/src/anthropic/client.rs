use crate::models::{BaseProvider, Message, ProviderSettings};
use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tools::ToolSpec;

use super::models::{AnthropicRequest, AnthropicResponse, AnthropicStopReason};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: Option<f64>,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AnthropicProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        if settings.api_key.is_empty() {
            bail!("Anthropic provider requires an API key");
        }

        Ok(AnthropicProvider {
            api_key: settings.api_key,
            model: settings.model,
            base_url: settings
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            client: reqwest::Client::new(),
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl BaseProvider for AnthropicProvider {
    async fn query(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<Message> {
        let request = AnthropicRequest::build(
            &self.model,
            self.max_tokens,
            self.temperature,
            messages,
            tools,
        )?;

        let endpoint = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&endpoint)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Anthropic API returned {}: {}", status, body);
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        if response.stop_reason == Some(AnthropicStopReason::MaxTokens) {
            tracing::warn!(id = %response.id, "Response truncated at max_tokens");
        }
        if let Some(usage) = &response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Anthropic usage"
            );
        }

        response.try_into()
    }
}
