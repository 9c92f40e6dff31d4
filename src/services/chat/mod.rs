//! Chat completion models.

mod family;

pub use family::{ModelFamily, render_llama3, render_mistral, render_titan};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::bedrock::BedrockRuntime;
use crate::error::ChatError;
use crate::models::ChatMessage;

/// A model that continues a conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the next assistant message.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;

    fn model_id(&self) -> &str;
}

/// Chat model served by Amazon Bedrock.
#[derive(Debug, Clone)]
pub struct BedrockChat {
    runtime: BedrockRuntime,
    model_id: String,
    family: ModelFamily,
    temperature: f32,
}

impl BedrockChat {
    /// Fails with [`ChatError::UnsupportedModel`] when the model id does not
    /// belong to a known family.
    pub fn new(runtime: BedrockRuntime, model_id: impl Into<String>) -> Result<Self, ChatError> {
        let model_id = model_id.into();
        let family = ModelFamily::from_model_id(&model_id)
            .ok_or_else(|| ChatError::UnsupportedModel(model_id.clone()))?;
        Ok(Self {
            runtime,
            model_id,
            family,
            temperature: 0.0,
        })
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }
}

#[async_trait]
impl ChatModel for BedrockChat {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let body = self.family.request_body(messages, self.temperature);
        debug!(model_id = %self.model_id, family = ?self.family, "invoking chat model");

        let response: Value = self
            .runtime
            .invoke_json(&self.model_id, &body)
            .await?;

        self.family.parse_response(&response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
