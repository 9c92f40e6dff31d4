//! Deterministic model stand-ins for tests.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use super::chat::ChatModel;
use super::embedding::Embedder;
use crate::error::{ChatError, EmbeddingError};
use crate::models::ChatMessage;

pub const FAKE_DIMENSIONS: usize = 64;

/// Bag-of-words embedder: each lowercase word bumps one hashed bucket.
#[derive(Debug, Default)]
pub struct HashEmbedder;

impl HashEmbedder {
    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; FAKE_DIMENSIONS];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            v[(hasher.finish() % FAKE_DIMENSIONS as u64) as usize] += 1.0;
        }
        if v.iter().all(|x| *x == 0.0) {
            v[0] = 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(Self::vector(text))
    }

    fn model_id(&self) -> &str {
        "fake.hash-embed"
    }
}

/// Chat model that replays canned answers and records every prompt.
#[derive(Debug, Default)]
pub struct ScriptedChat {
    answers: Mutex<Vec<String>>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().rev().map(|a| a.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        self.answers
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ChatError::InvalidResponse("no scripted answer left".to_string()))
    }

    fn model_id(&self) -> &str {
        "fake.scripted-chat"
    }
}
