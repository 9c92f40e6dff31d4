mod chunk;
pub mod config;
mod conversation;
mod document;
mod events;
pub mod storage_key;
mod upload;

pub use chunk::{DocumentChunk, LoadedDocument};
pub use config::{
    BedrockConfig, ChunkingConfig, DeleteConfig, EmbeddingsConfig, Env, ProcessEnv,
    ResponseConfig, UploadConfig,
};
pub use conversation::{ChatMessage, Role, format_history};
pub use document::{ConversationRef, Document, DocumentStatus};
pub use events::{
    ApiGatewayEvent, DeleteDocumentResponse, EmbeddingMessage, GenerateRequest, SqsEvent,
    SqsMessage, UploadUrlResponse, json_response,
};
pub use upload::{
    CONTENT_TYPE_JSON, CONTENT_TYPE_PDF, ManifestEntry, UploadTarget, extension_for,
    normalize_name,
};
