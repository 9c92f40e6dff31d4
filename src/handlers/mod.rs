//! Lambda handlers.
//!
//! Each handler takes its dependencies as an explicit struct built once per
//! process, so the same code runs against AWS clients in production and
//! in-memory services in tests.

pub mod delete;
pub mod embeddings;
pub mod response;
pub mod upload_url;

use aws_config::SdkConfig;
use std::sync::Arc;
use std::time::Duration;

use crate::error::HandlerError;
use crate::models::{ApiGatewayEvent, DeleteConfig, EmbeddingsConfig, ResponseConfig, UploadConfig};
use crate::services::{
    BedrockChat, BedrockEmbeddings, BedrockRuntime, ChatHistoryStore, ChatModel, DocumentTable,
    DynamoChatHistory, DynamoDocumentTable, Embedder, GoogleSearch, HttpPageFetcher, ObjectStore,
    PageFetcher, S3ObjectStore, TextChunker, WebSearch,
};

pub struct UploadDeps {
    pub store: Arc<dyn ObjectStore>,
    pub search: Arc<dyn WebSearch>,
    pub presign_expiry_secs: u64,
    pub search_results: usize,
}

pub struct EmbeddingDeps {
    pub store: Arc<dyn ObjectStore>,
    pub documents: Arc<dyn DocumentTable>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub embedder: Arc<dyn Embedder>,
    pub chunker: TextChunker,
}

pub struct ResponseDeps {
    pub store: Arc<dyn ObjectStore>,
    pub history: Arc<dyn ChatHistoryStore>,
    pub embedder: Arc<dyn Embedder>,
    pub model: Arc<dyn ChatModel>,
    pub retrieval_k: usize,
}

pub struct DeleteDeps {
    pub store: Arc<dyn ObjectStore>,
    pub documents: Arc<dyn DocumentTable>,
    pub history: Arc<dyn ChatHistoryStore>,
}

impl UploadDeps {
    pub fn from_config(sdk_config: &SdkConfig, config: &UploadConfig) -> Result<Self, HandlerError> {
        Ok(Self {
            store: Arc::new(S3ObjectStore::regional(
                sdk_config,
                &config.region,
                &config.bucket,
            )),
            search: Arc::new(GoogleSearch::new(Duration::from_secs(
                config.http_timeout_secs,
            ))?),
            presign_expiry_secs: config.presign_expiry_secs,
            search_results: config.search_results,
        })
    }
}

impl EmbeddingDeps {
    pub fn from_config(
        sdk_config: &SdkConfig,
        config: &EmbeddingsConfig,
    ) -> Result<Self, HandlerError> {
        let runtime = BedrockRuntime::from_sdk_config(sdk_config, &config.bedrock.region);
        Ok(Self {
            store: Arc::new(S3ObjectStore::from_sdk_config(sdk_config, &config.bucket)),
            documents: Arc::new(DynamoDocumentTable::from_sdk_config(
                sdk_config,
                &config.document_table,
            )),
            fetcher: Arc::new(HttpPageFetcher::new(Duration::from_secs(
                config.http_timeout_secs,
            ))?),
            embedder: Arc::new(BedrockEmbeddings::new(
                runtime,
                &config.bedrock.embedding_model_id,
            )?),
            chunker: TextChunker::new(&config.chunking),
        })
    }
}

impl ResponseDeps {
    /// Fails with an unsupported-model error when `MODEL_ID` names a model
    /// family without a prompt strategy.
    pub fn from_config(sdk_config: &SdkConfig, config: &ResponseConfig) -> Result<Self, HandlerError> {
        let runtime = BedrockRuntime::from_sdk_config(sdk_config, &config.bedrock.region);
        Ok(Self {
            store: Arc::new(S3ObjectStore::from_sdk_config(sdk_config, &config.bucket)),
            history: Arc::new(DynamoChatHistory::from_sdk_config(
                sdk_config,
                &config.memory_table,
            )),
            embedder: Arc::new(BedrockEmbeddings::new(
                runtime.clone(),
                &config.bedrock.embedding_model_id,
            )?),
            model: Arc::new(BedrockChat::new(runtime, &config.model_id)?),
            retrieval_k: config.retrieval_k,
        })
    }
}

impl DeleteDeps {
    pub fn from_config(sdk_config: &SdkConfig, config: &DeleteConfig) -> Self {
        Self {
            store: Arc::new(S3ObjectStore::from_sdk_config(sdk_config, &config.bucket)),
            documents: Arc::new(DynamoDocumentTable::from_sdk_config(
                sdk_config,
                &config.document_table,
            )),
            history: Arc::new(DynamoChatHistory::from_sdk_config(
                sdk_config,
                &config.memory_table,
            )),
        }
    }
}

/// Authenticated user of an API Gateway request.
fn require_user(event: &ApiGatewayEvent) -> Result<&str, HandlerError> {
    event
        .user_id()
        .ok_or_else(|| HandlerError::missing("requestContext.authorizer.claims.sub"))
}

fn require_path<'a>(event: &'a ApiGatewayEvent, name: &str) -> Result<&'a str, HandlerError> {
    event
        .path_parameter(name)
        .ok_or_else(|| HandlerError::missing(&format!("path parameter {name}")))
}
