use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{ChatHistoryStore, DocumentTable};
use crate::error::TableError;
use crate::models::{ChatMessage, Document, DocumentStatus};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-memory document table.
///
/// Records every status write so tests can assert the transitions.
#[derive(Debug, Default)]
pub struct MemoryDocumentTable {
    rows: Mutex<HashMap<(String, String), Document>>,
    status_log: Mutex<Vec<(String, DocumentStatus)>>,
}

impl MemoryDocumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, document: Document) {
        let key = (document.userid.clone(), document.documentid.clone());
        lock(&self.rows).insert(key, document);
    }

    /// Status writes for one document, in order.
    pub fn status_history(&self, document_id: &str) -> Vec<DocumentStatus> {
        lock(&self.status_log)
            .iter()
            .filter(|(id, _)| id == document_id)
            .map(|(_, status)| *status)
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentTable for MemoryDocumentTable {
    async fn get(&self, user_id: &str, document_id: &str) -> Result<Option<Document>, TableError> {
        Ok(lock(&self.rows)
            .get(&(user_id.to_string(), document_id.to_string()))
            .cloned())
    }

    async fn set_status(
        &self,
        user_id: &str,
        document_id: &str,
        status: DocumentStatus,
    ) -> Result<(), TableError> {
        // UpdateItem upserts, so a missing row is created with just its key.
        lock(&self.rows)
            .entry((user_id.to_string(), document_id.to_string()))
            .or_insert_with(|| Document::new(user_id, document_id, ""))
            .docstatus = status;
        lock(&self.status_log).push((document_id.to_string(), status));
        Ok(())
    }

    async fn delete(&self, user_id: &str, document_id: &str) -> Result<(), TableError> {
        lock(&self.rows).remove(&(user_id.to_string(), document_id.to_string()));
        Ok(())
    }
}

/// In-memory conversation history.
#[derive(Debug, Default)]
pub struct MemoryChatHistory {
    sessions: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl MemoryChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        lock(&self.sessions).contains_key(session_id)
    }
}

#[async_trait]
impl ChatHistoryStore for MemoryChatHistory {
    async fn messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, TableError> {
        Ok(lock(&self.sessions)
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, session_id: &str, messages: &[ChatMessage]) -> Result<(), TableError> {
        lock(&self.sessions)
            .entry(session_id.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<bool, TableError> {
        Ok(lock(&self.sessions).remove(session_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_status_log() {
        let table = MemoryDocumentTable::new();
        table.insert(Document::new("u1", "doc-1", "report"));
        table
            .set_status("u1", "doc-1", DocumentStatus::Processing)
            .await
            .unwrap();
        table
            .set_status("u1", "doc-1", DocumentStatus::Ready)
            .await
            .unwrap();

        assert_eq!(
            table.status_history("doc-1"),
            vec![DocumentStatus::Processing, DocumentStatus::Ready]
        );
        let doc = table.get("u1", "doc-1").await.unwrap().unwrap();
        assert_eq!(doc.docstatus, DocumentStatus::Ready);
    }

    #[tokio::test]
    async fn test_history_append_and_delete() {
        let history = MemoryChatHistory::new();
        assert!(history.messages("c1").await.unwrap().is_empty());

        history
            .append("c1", &[ChatMessage::human("hi"), ChatMessage::ai("hello")])
            .await
            .unwrap();
        assert_eq!(history.messages("c1").await.unwrap().len(), 2);

        assert!(history.delete("c1").await.unwrap());
        assert!(!history.delete("c1").await.unwrap());
    }
}
