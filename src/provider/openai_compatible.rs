//! Invoker for OpenAI-compatible Chat Completions endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http::{bearer_headers, status_to_error};
use super::ProviderInvoker;
use crate::error::RelayError;
use crate::types::InvocationRequest;

/// Non-streaming `POST {base_url}/chat/completions` invoker.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleInvoker {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OpenAiCompatibleInvoker {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            timeout,
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn build_request_body(&self, request: &InvocationRequest<'_>) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role.to_string(),
                    "content": m.content,
                })
            })
            .collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "stream": false,
        });
        if let (Some(temp), Some(obj)) = (request.temperature, body.as_object_mut()) {
            obj.insert("temperature".into(), temp.into());
        }
        body
    }

    /// A request past its deadline is a `Timeout` carrying the configured
    /// budget; anything else stays a network error.
    fn transport_error(&self, err: reqwest::Error) -> RelayError {
        if err.is_timeout() {
            RelayError::Timeout(self.timeout.as_millis() as u64)
        } else {
            RelayError::Network(err)
        }
    }

    async fn send(&self, request: &InvocationRequest<'_>) -> Result<String, RelayError> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            provider = request.provider,
            model = request.model,
            "OpenAI-compatible invoke"
        );

        let resp = self
            .client
            .post(&url)
            .headers(bearer_headers(self.api_key.as_deref()))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: ChatCompletionResponse =
            resp.json().await.map_err(|e| self.transport_error(e))?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::provider(request.provider, "No choices in response"))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl ProviderInvoker for OpenAiCompatibleInvoker {
    async fn invoke(&self, request: &InvocationRequest<'_>) -> Result<String, RelayError> {
        self.send(request).await
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
