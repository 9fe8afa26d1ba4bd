//! Azure OpenAI chat-completion backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatCompletion, ChatMessage};
use crate::config::TranslatorConfig;
use crate::error::TranslateError;

/// Azure OpenAI API request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// Azure OpenAI API response choice message
#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Azure OpenAI API response choice
#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

/// Azure OpenAI API response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

/// Azure OpenAI API error
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Azure OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// Chat completions against an Azure OpenAI deployment.
pub struct AzureOpenAiClient {
    client: Client,
    config: TranslatorConfig,
}

impl AzureOpenAiClient {
    /// Create a client for the configured deployment.
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// `{endpoint}/openai/deployments/{deployment}/chat/completions`
    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment
        )
    }
}

#[async_trait]
impl ChatCompletion for AzureOpenAiClient {
    fn name(&self) -> &'static str {
        "azure-openai"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, TranslateError> {
        let request = ChatRequest {
            model: &self.config.deployment,
            messages,
        };

        let response = self
            .client
            .post(self.completions_url())
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(TranslateError::Api { status, message });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(TranslateError::EmptyResponse)
    }
}
