//! Conversational retrieval over a document's vector index.
//!
//! A follow-up question is first rewritten into a standalone question using
//! the chat history, then answered from the closest chunks of the index.

use serde::Serialize;
use tracing::{debug, info};

use super::chat::ChatModel;
use super::embedding::Embedder;
use super::tables::ChatHistoryStore;
use super::vector_index::{RetrievedChunk, VectorIndex};
use crate::error::HandlerError;
use crate::models::{ChatMessage, format_history};

const CONDENSE_QUESTION_INSTRUCTIONS: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question, in its original language.";

const QA_INSTRUCTIONS: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Prompt rewriting a follow-up question into a standalone one. History and
/// question are inserted verbatim.
pub fn condense_prompt(history: &[ChatMessage], question: &str) -> String {
    format!(
        "{CONDENSE_QUESTION_INSTRUCTIONS}\n\nChat History:\n{}\nFollow Up Input: {question}\nStandalone question:",
        format_history(history)
    )
}

/// Stuff retrieved chunks into the answering prompt.
pub fn qa_prompt(chunks: &[RetrievedChunk], question: &str) -> String {
    let context = chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{QA_INSTRUCTIONS}\n\n{context}\n\nQuestion: {question}\nHelpful Answer:")
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainResponse {
    pub answer: String,
    pub standalone_question: String,
    pub source_documents: Vec<RetrievedChunk>,
}

pub struct ConversationalRetrievalChain<'a> {
    pub model: &'a dyn ChatModel,
    pub embedder: &'a dyn Embedder,
    pub index: &'a VectorIndex,
    pub history: &'a dyn ChatHistoryStore,
    pub k: usize,
}

impl ConversationalRetrievalChain<'_> {
    /// Answer `question` within the session and record both turns.
    pub async fn run(&self, session_id: &str, question: &str) -> Result<ChainResponse, HandlerError> {
        let history = self.history.messages(session_id).await?;

        let standalone_question = if history.is_empty() {
            question.to_string()
        } else {
            let prompt = condense_prompt(&history, question);
            self.model.generate(&[ChatMessage::human(prompt)]).await?
        };
        debug!(session_id, %standalone_question, turns = history.len(), "condensed question");

        let query = self.embedder.embed_query(&standalone_question).await?;
        let source_documents = self.index.search(&query, self.k)?;

        let prompt = qa_prompt(&source_documents, &standalone_question);
        let answer = self.model.generate(&[ChatMessage::human(prompt)]).await?;

        self.history
            .append(
                session_id,
                &[ChatMessage::human(question), ChatMessage::ai(answer.clone())],
            )
            .await?;

        info!(
            session_id,
            sources = ?source_documents.iter().map(|d| d.source.as_str()).collect::<Vec<_>>(),
            "answered question"
        );

        Ok(ChainResponse {
            answer,
            standalone_question,
            source_documents,
        })
    }
}
