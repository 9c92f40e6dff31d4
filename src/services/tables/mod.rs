//! Key-value table abstractions: the document table and the
//! conversation history table.

mod dynamodb;
#[cfg(test)]
mod memory;

pub use dynamodb::{DynamoChatHistory, DynamoDocumentTable};
#[cfg(test)]
pub use memory::{MemoryChatHistory, MemoryDocumentTable};

use async_trait::async_trait;

use crate::error::TableError;
use crate::models::{ChatMessage, Document, DocumentStatus};

/// Document rows keyed by (`userid`, `documentid`).
#[async_trait]
pub trait DocumentTable: Send + Sync {
    /// Fetch a document; `None` when no row exists.
    async fn get(&self, user_id: &str, document_id: &str) -> Result<Option<Document>, TableError>;

    /// Set the `docstatus` attribute.
    async fn set_status(
        &self,
        user_id: &str,
        document_id: &str,
        status: DocumentStatus,
    ) -> Result<(), TableError>;

    /// Delete a document row.
    async fn delete(&self, user_id: &str, document_id: &str) -> Result<(), TableError>;
}

/// Conversation history keyed by session id.
#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    /// Messages of a session in order; empty for an unknown session.
    async fn messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, TableError>;

    /// Append messages, creating the session on first write.
    async fn append(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), TableError>;

    /// Delete a session. Returns whether a record was removed.
    async fn delete(&self, session_id: &str) -> Result<bool, TableError>;
}
