//! Resolution and invocation requests.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::message::ModelMessage;

/// What a caller asks the resolver to send to whichever candidate wins.
///
/// Either a single prompt (wrapped as one user message) or an ordered list of
/// role-tagged messages, plus an optional sampling temperature.
///
/// ```
/// use modelrelay::types::{ChatRequest, ModelMessage};
///
/// let request = ChatRequest::builder()
///     .messages(vec![ModelMessage::system("be brief"), ModelMessage::user("hi")])
///     .temperature(0.7)
///     .build();
/// assert_eq!(request.messages.len(), 2);
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ModelMessage>,
    pub temperature: Option<f64>,
}

impl ChatRequest {
    /// Wrap a single prompt string as one user message.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ModelMessage::user(text)],
            temperature: None,
        }
    }

    /// Use an explicit conversation.
    pub fn from_messages(messages: Vec<ModelMessage>) -> Self {
        Self {
            messages,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl From<&str> for ChatRequest {
    fn from(prompt: &str) -> Self {
        Self::prompt(prompt)
    }
}

impl From<String> for ChatRequest {
    fn from(prompt: String) -> Self {
        Self::prompt(prompt)
    }
}

/// A single candidate call handed to a [`ProviderInvoker`](crate::provider::ProviderInvoker).
#[derive(Debug, Clone, Copy)]
pub struct InvocationRequest<'a> {
    /// Raw, provider-specific model identifier.
    pub model: &'a str,
    pub provider: &'a str,
    pub messages: &'a [ModelMessage],
    pub temperature: Option<f64>,
}

impl<'a> InvocationRequest<'a> {
    pub fn new(model: &'a str, provider: &'a str, request: &'a ChatRequest) -> Self {
        Self {
            model,
            provider,
            messages: &request.messages,
            temperature: request.temperature,
        }
    }
}
