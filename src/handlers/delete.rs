//! Deletes a document with its stored objects and conversations.

use aws_lambda_events::event::apigw::ApiGatewayProxyResponse;
use tracing::{debug, info};

use super::{DeleteDeps, require_path, require_user};
use crate::error::{HandlerError, TableError};
use crate::models::{ApiGatewayEvent, DeleteDocumentResponse, json_response};
use crate::services::remove_folder;

const OPERATION: &str = "deleted_document";

pub async fn handle(
    deps: &DeleteDeps,
    event: ApiGatewayEvent,
) -> Result<ApiGatewayProxyResponse, HandlerError> {
    debug!(?event, "delete document request");
    let user_id = require_user(&event)?;
    let document_id = require_path(&event, "documentid")?;
    info!(user_id, document_id, "deleting document");

    let document = deps
        .documents
        .get(user_id, document_id)
        .await?
        .ok_or_else(|| TableError::NotFound(format!("{user_id}/{document_id}")))?;

    let folder = document.folder_prefix();
    let removed = remove_folder(deps.store.as_ref(), &folder).await?;
    info!(%folder, removed, "deleted folder");

    let mut conversation_ids = Vec::new();
    for conversation in &document.conversations {
        if deps.history.delete(&conversation.conversationid).await? {
            info!(conversation_id = %conversation.conversationid, "deleted conversation");
            conversation_ids.push(conversation.conversationid.clone());
        }
    }

    deps.documents.delete(user_id, document_id).await?;
    info!(document_id, "deleted document");

    Ok(json_response(&DeleteDocumentResponse {
        operation: OPERATION.to_string(),
        document_id: document_id.to_string(),
        conversation_ids,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, Document};
    use crate::services::{
        ChatHistoryStore, MemoryChatHistory, MemoryDocumentTable, MemoryObjectStore,
    };
    use std::sync::Arc;

    struct Fixture {
        store: Arc<MemoryObjectStore>,
        documents: Arc<MemoryDocumentTable>,
        history: Arc<MemoryChatHistory>,
        deps: DeleteDeps,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryObjectStore::new("bucket"));
        let documents = Arc::new(MemoryDocumentTable::new());
        let history = Arc::new(MemoryChatHistory::new());
        let deps = DeleteDeps {
            store: store.clone(),
            documents: documents.clone(),
            history: history.clone(),
        };
        Fixture {
            store,
            documents,
            history,
            deps,
        }
    }

    fn event(document_id: &str) -> ApiGatewayEvent {
        ApiGatewayEvent::for_user("u1").with_path_parameter("documentid", document_id)
    }

    #[tokio::test]
    async fn test_deletes_everything() {
        let f = fixture();
        f.documents.insert(
            Document::new("u1", "d1", "report")
                .with_key("u1/report/report.pdf")
                .with_conversation("c1")
                .with_conversation("c2"),
        );
        for key in ["u1/report/report.pdf", "u1/report/index.usearch", "u1/report/index.json"] {
            f.store.insert(key, b"x".to_vec());
        }
        f.store.insert("u1/other/other.pdf", b"x".to_vec());
        // Only c1 has a stored history.
        f.history
            .append("c1", &[ChatMessage::human("hi")])
            .await
            .unwrap();

        let response = handle(&f.deps, event("d1")).await.unwrap();
        let body: DeleteDocumentResponse = serde_json::from_slice(response.body.as_deref().unwrap()).unwrap();

        assert_eq!(body.operation, "deleted_document");
        assert_eq!(body.document_id, "d1");
        assert_eq!(body.conversation_ids, vec!["c1".to_string()]);
        assert_eq!(f.store.keys(), vec!["u1/other/other.pdf".to_string()]);
        assert!(!f.history.contains("c1"));
        assert!(f.documents.is_empty());
    }

    #[tokio::test]
    async fn test_both_conversations_deleted() {
        let f = fixture();
        f.documents.insert(
            Document::new("u1", "d1", "report")
                .with_conversation("c1")
                .with_conversation("c2"),
        );
        for id in ["c1", "c2"] {
            f.history.append(id, &[ChatMessage::human("hi")]).await.unwrap();
        }

        let response = handle(&f.deps, event("d1")).await.unwrap();
        let body: DeleteDocumentResponse = serde_json::from_slice(response.body.as_deref().unwrap()).unwrap();
        assert_eq!(body.conversation_ids, vec!["c1".to_string(), "c2".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_folder() {
        let f = fixture();
        f.documents.insert(Document::new("u1", "d1", "report"));

        let response = handle(&f.deps, event("d1")).await.unwrap();
        let body: DeleteDocumentResponse = serde_json::from_slice(response.body.as_deref().unwrap()).unwrap();
        assert!(body.conversation_ids.is_empty());
        assert!(f.documents.is_empty());
    }

    #[tokio::test]
    async fn test_missing_document() {
        let f = fixture();
        let result = handle(&f.deps, event("nope")).await;
        assert!(matches!(result, Err(HandlerError::Table(TableError::NotFound(_)))));
    }
}
