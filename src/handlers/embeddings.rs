//! Builds the vector index of an uploaded document.
//!
//! Triggered by queue messages `{documentid, user, key}`. The document goes
//! `PROCESSING` → `READY`, or `PROCESSING` → `ERROR` when its content
//! cannot be loaded. Failures after loading propagate so the queue
//! redelivers the message; the status then stays `PROCESSING`.

use tracing::{debug, error, info};

use super::EmbeddingDeps;
use crate::error::HandlerError;
use crate::models::storage_key::{INDEX_METADATA, INDEX_STRUCTURE, artifact_key, folder_of};
use crate::models::{DocumentStatus, EmbeddingMessage, SqsEvent};
use crate::services::VectorIndex;
use crate::sources::{DocumentSource, LoadContext};

const CONTENT_TYPE_INDEX: &str = "application/octet-stream";
const CONTENT_TYPE_METADATA: &str = "application/json";

/// Process every record of the batch in order.
pub async fn handle(deps: &EmbeddingDeps, event: SqsEvent) -> Result<(), HandlerError> {
    debug!(records = event.records.len(), "embedding batch");
    for record in &event.records {
        let body = record
            .body
            .as_deref()
            .ok_or_else(|| HandlerError::missing("SQS record body"))?;
        let message: EmbeddingMessage = serde_json::from_str(body)?;
        let status = process(deps, &message).await?;
        info!(
            message_id = record.message_id.as_deref().unwrap_or_default(),
            document_id = %message.documentid,
            %status,
            "processed document"
        );
    }
    Ok(())
}

/// Index one document and return the terminal status written.
pub async fn process(
    deps: &EmbeddingDeps,
    message: &EmbeddingMessage,
) -> Result<DocumentStatus, HandlerError> {
    let EmbeddingMessage {
        documentid,
        user,
        key,
    } = message;
    info!(user_id = %user, document_id = %documentid, %key, "generating embeddings");

    deps.documents
        .set_status(user, documentid, DocumentStatus::Processing)
        .await?;
    let body = deps.store.get(key).await?;

    let ctx = LoadContext {
        store: deps.store.as_ref(),
        fetcher: deps.fetcher.as_ref(),
    };
    let loaded = match DocumentSource::from_key(key) {
        Some(source) => source.load(ctx, key, &body).await.map_err(|e| {
            error!(%key, ?source, error = %e, "failed to load document");
        }),
        None => {
            error!(%key, "no loader for document type");
            Err(())
        }
    };
    let Ok(documents) = loaded else {
        deps.documents
            .set_status(user, documentid, DocumentStatus::Error)
            .await?;
        return Ok(DocumentStatus::Error);
    };

    let mut chunks = deps.chunker.chunk_all(&documents);
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = deps.embedder.embed_documents(&texts).await?;
    for (chunk, vector) in chunks.iter_mut().zip(vectors) {
        chunk.dense_vector = vector;
    }
    debug!(chunks = chunks.len(), "embedded chunks");

    let index = VectorIndex::build(&chunks, deps.embedder.model_id())?;
    let artifacts = index.to_artifacts()?;

    let folder = folder_of(key)
        .ok_or_else(|| HandlerError::BadRequest(format!("key without folder: {key}")))?;
    deps.store
        .put(
            &artifact_key(folder, INDEX_STRUCTURE),
            artifacts.structure,
            CONTENT_TYPE_INDEX,
        )
        .await?;
    deps.store
        .put(
            &artifact_key(folder, INDEX_METADATA),
            artifacts.metadata,
            CONTENT_TYPE_METADATA,
        )
        .await?;

    deps.documents
        .set_status(user, documentid, DocumentStatus::Ready)
        .await?;
    Ok(DocumentStatus::Ready)
}
