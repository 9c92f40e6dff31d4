use serde::{Deserialize, Serialize};

/// Text loaded out of a stored document, before chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedDocument {
    pub content: String,
    /// Where the text came from: the uploaded file name, or the page URL
    /// for manifest inputs
    pub source: String,
}

impl LoadedDocument {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }

    /// Identifier derived from the source and content.
    pub fn generate_id(&self) -> String {
        use sha2::{Digest, Sha256};
        let input = format!("{}:{}", self.source, self.content.len());
        let hash = Sha256::digest(input.as_bytes());
        hex::encode(&hash[..16])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub content: String,
    pub source: String,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub start_offset: u64,
    pub end_offset: u64,
    pub checksum: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dense_vector: Vec<f32>,
}

impl DocumentChunk {
    pub fn generate_id(document_id: &str, chunk_index: u32) -> String {
        use uuid::Uuid;
        let name = format!("{}:{}", document_id, chunk_index);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
    }

    pub fn from_document(
        document: &LoadedDocument,
        content: String,
        chunk_index: u32,
        total_chunks: u32,
        start_offset: u64,
        end_offset: u64,
    ) -> Self {
        let id = Self::generate_id(&document.generate_id(), chunk_index);
        let checksum = crate::utils::calculate_checksum(&content);
        Self {
            id,
            content,
            source: document.source.clone(),
            chunk_index,
            total_chunks,
            start_offset,
            end_offset,
            checksum,
            dense_vector: Vec::new(),
        }
    }
}
