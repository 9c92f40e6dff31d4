//! Answers a question about a document within a conversation.

use aws_lambda_events::event::apigw::ApiGatewayProxyResponse;
use tracing::{debug, info};

use super::{ResponseDeps, require_path, require_user};
use crate::error::HandlerError;
use crate::models::storage_key::{INDEX_METADATA, INDEX_STRUCTURE, artifact_key, document_folder};
use crate::models::{ApiGatewayEvent, GenerateRequest, json_response};
use crate::services::{ConversationalRetrievalChain, VectorIndex};

pub async fn handle(
    deps: &ResponseDeps,
    event: ApiGatewayEvent,
) -> Result<ApiGatewayProxyResponse, HandlerError> {
    debug!(?event, "generate response request");
    let user_id = require_user(&event)?;
    let conversation_id = require_path(&event, "conversationid")?;
    let request: GenerateRequest =
        serde_json::from_str(event.body.as_deref().ok_or_else(|| HandlerError::missing("body"))?)?;
    info!(
        user_id,
        conversation_id,
        file_name = %request.file_name,
        model_id = deps.model.model_id(),
        "generating response"
    );

    let folder = document_folder(user_id, &request.file_name);
    let structure = deps
        .store
        .get(&artifact_key(&folder, INDEX_STRUCTURE))
        .await?;
    let metadata = deps
        .store
        .get(&artifact_key(&folder, INDEX_METADATA))
        .await?;
    let index = VectorIndex::from_artifacts(&structure, &metadata)?;

    let chain = ConversationalRetrievalChain {
        model: deps.model.as_ref(),
        embedder: deps.embedder.as_ref(),
        index: &index,
        history: deps.history.as_ref(),
        k: deps.retrieval_k,
    };
    let response = chain.run(conversation_id, &request.prompt).await?;
    info!(answer = %response.answer, "generated answer");

    Ok(json_response(&response.answer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use aws_lambda_events::encodings::Body;
    use crate::models::{ChunkingConfig, DocumentChunk, LoadedDocument};
    use crate::services::fake::{HashEmbedder, ScriptedChat};
    use crate::services::{
        BedrockChat, BedrockRuntime, ChatHistoryStore, Embedder, MemoryChatHistory,
        MemoryObjectStore, ObjectStore, TextChunker,
    };
    use std::sync::Arc;

    async fn store_index(store: &MemoryObjectStore, folder: &str, text: &str) {
        let chunker = TextChunker::new(&ChunkingConfig::default());
        let mut chunks: Vec<DocumentChunk> =
            chunker.chunk(&LoadedDocument::new(text, "report.pdf"));
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = HashEmbedder.embed_documents(&texts).await.unwrap();
        for (chunk, vector) in chunks.iter_mut().zip(vectors) {
            chunk.dense_vector = vector;
        }
        let artifacts = VectorIndex::build(&chunks, "fake.hash-embed")
            .unwrap()
            .to_artifacts()
            .unwrap();
        store
            .put(&artifact_key(folder, INDEX_STRUCTURE), artifacts.structure, "application/octet-stream")
            .await
            .unwrap();
        store
            .put(&artifact_key(folder, INDEX_METADATA), artifacts.metadata, "application/json")
            .await
            .unwrap();
    }

    fn event(prompt: &str) -> ApiGatewayEvent {
        ApiGatewayEvent::for_user("u1")
            .with_path_parameter("conversationid", "c1")
            .with_body(
                serde_json::to_string(&GenerateRequest {
                    file_name: "report".to_string(),
                    prompt: prompt.to_string(),
                })
                .unwrap(),
            )
    }

    #[tokio::test]
    async fn test_answers_and_records_history() {
        let store = Arc::new(MemoryObjectStore::new("bucket"));
        store_index(&store, "u1/report", "Quarterly revenue grew ten percent.").await;
        let history = Arc::new(MemoryChatHistory::new());
        let model = Arc::new(ScriptedChat::new(&["Ten percent."]));
        let deps = ResponseDeps {
            store,
            history: history.clone(),
            embedder: Arc::new(HashEmbedder),
            model: model.clone(),
            retrieval_k: 4,
        };

        let response = handle(&deps, event("How much did revenue grow?")).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, Some(Body::Text("\"Ten percent.\"".to_string())));

        let prompt = &model.prompts()[0][0].content;
        assert!(prompt.contains("Quarterly revenue grew ten percent."));
        assert_eq!(history.messages("c1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_index_is_error() {
        let deps = ResponseDeps {
            store: Arc::new(MemoryObjectStore::new("bucket")),
            history: Arc::new(MemoryChatHistory::new()),
            embedder: Arc::new(HashEmbedder),
            model: Arc::new(ScriptedChat::new(&[])),
            retrieval_k: 4,
        };
        let result = handle(&deps, event("anything")).await;
        assert!(matches!(result, Err(HandlerError::Storage(_))));
    }

    #[tokio::test]
    async fn test_unsupported_model_is_error() {
        let sdk_config = aws_config::SdkConfig::builder()
            .behavior_version(aws_config::BehaviorVersion::latest())
            .build();
        let runtime = BedrockRuntime::from_sdk_config(&sdk_config, "us-east-1");

        let err = BedrockChat::new(runtime.clone(), "ai21.j2-ultra-v1").unwrap_err();
        assert!(matches!(err, ChatError::UnsupportedModel(_)));
        assert_eq!(err.to_string(), "Unsupported model ID: ai21.j2-ultra-v1");

        assert!(BedrockChat::new(runtime, "meta.llama3-8b-instruct-v1:0").is_ok());
    }
}
