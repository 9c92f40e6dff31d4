pub mod bedrock;
mod chain;
pub mod chat;
mod chunker;
mod embedding;
#[cfg(test)]
pub(crate) mod fake;
pub mod storage;
pub mod tables;
mod vector_index;
pub mod web;

pub use bedrock::BedrockRuntime;
pub use chain::{ChainResponse, ConversationalRetrievalChain, condense_prompt, qa_prompt};
pub use chat::{BedrockChat, ChatModel, ModelFamily};
pub use chunker::TextChunker;
pub use embedding::{BedrockEmbeddings, Embedder, InstructionType};
pub use storage::{ObjectStore, S3ObjectStore, folder_in_use, remove_folder};
#[cfg(test)]
pub use storage::MemoryObjectStore;
pub use tables::{ChatHistoryStore, DocumentTable, DynamoChatHistory, DynamoDocumentTable};
#[cfg(test)]
pub use tables::{MemoryChatHistory, MemoryDocumentTable};
pub use vector_index::{IndexArtifacts, IndexMetadata, RetrievedChunk, StoredChunk, VectorIndex};
pub use web::{GoogleSearch, HttpPageFetcher, PageFetcher, WebSearch, html_to_text};
