//! Embedding client for generating text embeddings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::bedrock::{BedrockRuntime, base_model_id};
use crate::error::EmbeddingError;

/// Instruction type for embedding generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionType {
    /// For indexing documents
    SearchDocument,
    /// For search queries
    SearchQuery,
}

/// Anything that turns text into vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for documents (for indexing).
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Generate embedding for a query (for searching).
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Identifier of the embedding model, stored with the index.
    fn model_id(&self) -> &str;
}

/// Request layout of a Bedrock embedding model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmbeddingFamily {
    /// Amazon Titan: one text per request
    Titan,
    /// Cohere Embed: batched texts with an input type
    Cohere,
}

impl EmbeddingFamily {
    fn from_model_id(model_id: &str) -> Option<Self> {
        let base = base_model_id(model_id);
        if base.starts_with("amazon.titan-embed") {
            Some(EmbeddingFamily::Titan)
        } else if base.starts_with("cohere.embed") {
            Some(EmbeddingFamily::Cohere)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct TitanEmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct CohereEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Cohere accepts at most this many texts per request.
const COHERE_BATCH_SIZE: usize = 96;

/// Embeddings served by Amazon Bedrock.
#[derive(Debug, Clone)]
pub struct BedrockEmbeddings {
    runtime: BedrockRuntime,
    model_id: String,
    family: EmbeddingFamily,
}

impl BedrockEmbeddings {
    pub fn new(runtime: BedrockRuntime, model_id: impl Into<String>) -> Result<Self, EmbeddingError> {
        let model_id = model_id.into();
        let family = EmbeddingFamily::from_model_id(&model_id)
            .ok_or_else(|| EmbeddingError::UnsupportedModel(model_id.clone()))?;
        Ok(Self {
            runtime,
            model_id,
            family,
        })
    }

    async fn embed_titan(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = json!({ "inputText": clean_input(text) });
        let response: TitanEmbedResponse = self
            .runtime
            .invoke_json(&self.model_id, &body)
            .await?;
        Ok(response.embedding)
    }

    async fn embed_cohere(
        &self,
        texts: &[String],
        input_type: InstructionType,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(COHERE_BATCH_SIZE) {
            let body = json!({
                "texts": batch.iter().map(|t| clean_input(t)).collect::<Vec<_>>(),
                "input_type": input_type,
            });
            let response: CohereEmbedResponse = self
                .runtime
                .invoke_json(&self.model_id, &body)
                .await?;

            if response.embeddings.len() != batch.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    response.embeddings.len()
                )));
            }
            all_embeddings.extend(response.embeddings);
        }

        Ok(all_embeddings)
    }
}

#[async_trait]
impl Embedder for BedrockEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match self.family {
            EmbeddingFamily::Titan => {
                let mut embeddings = Vec::with_capacity(texts.len());
                for text in texts {
                    embeddings.push(self.embed_titan(text).await?);
                }
                Ok(embeddings)
            }
            EmbeddingFamily::Cohere => {
                self.embed_cohere(texts, InstructionType::SearchDocument)
                    .await
            }
        }
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self.family {
            EmbeddingFamily::Titan => self.embed_titan(text).await,
            EmbeddingFamily::Cohere => self
                .embed_cohere(&[text.to_string()], InstructionType::SearchQuery)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    EmbeddingError::InvalidResponse("empty embedding response".to_string())
                }),
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Newlines degrade embedding quality for these models.
fn clean_input(text: &str) -> String {
    text.replace('\n', " ")
}
