//! Error types for the document chat handlers.

use thiserror::Error;

/// Errors related to object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage request failed: {0}")]
    RequestError(String),

    #[error("presign error: {0}")]
    PresignError(String),

    #[error("failed to read object body: {0}")]
    BodyError(String),
}

/// Errors related to the document and conversation tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("item not found: {0}")]
    NotFound(String),

    #[error("table request failed: {0}")]
    RequestError(String),

    #[error("malformed item: {0}")]
    MalformedItem(String),
}

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("unsupported embedding model: {0}")]
    UnsupportedModel(String),

    #[error("embedding request failed: {0}")]
    RequestError(String),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Failure of a Bedrock `InvokeModel` round trip.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("model invocation failed: {0}")]
    Request(String),

    #[error("invalid model payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<InvokeError> for EmbeddingError {
    fn from(e: InvokeError) -> Self {
        match e {
            InvokeError::Request(msg) => EmbeddingError::RequestError(msg),
            InvokeError::Decode(e) => EmbeddingError::InvalidResponse(e.to_string()),
        }
    }
}

impl From<InvokeError> for ChatError {
    fn from(e: InvokeError) -> Self {
        match e {
            InvokeError::Request(msg) => ChatError::RequestError(msg),
            InvokeError::Decode(e) => ChatError::InvalidResponse(e.to_string()),
        }
    }
}

/// Errors related to chat model operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Unsupported model ID: {0}")]
    UnsupportedModel(String),

    #[error("model invocation failed: {0}")]
    RequestError(String),

    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

/// Errors related to the vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("index metadata error: {0}")]
    MetadataError(#[from] serde_json::Error),

    #[error("vector index error: {0}")]
    BackendError(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("no chunks to index")]
    Empty,
}

/// Errors related to loading text out of a stored document.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("PDF extraction failed: {0}")]
    PdfError(String),

    #[error("invalid URL manifest: {0}")]
    ManifestError(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("document contains no extractable text")]
    NoContent,
}

/// Errors related to HTTP page fetching and web search.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Handler-level errors that wrap the domain errors.
///
/// These propagate out of the Lambda handler so the runtime reports a
/// failed invocation.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("table error: {0}")]
    Table(#[from] TableError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl HandlerError {
    /// Build a bad request error for a missing event field.
    pub fn missing(field: &str) -> Self {
        HandlerError::BadRequest(format!("missing {field}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_error_conversions() {
        let request = InvokeError::Request("throttled".to_string());
        assert_eq!(request.to_string(), "model invocation failed: throttled");
        assert!(matches!(
            ChatError::from(request),
            ChatError::RequestError(msg) if msg == "throttled"
        ));

        let decode: InvokeError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(decode.to_string().starts_with("invalid model payload:"));
        assert!(matches!(
            EmbeddingError::from(decode),
            EmbeddingError::InvalidResponse(_)
        ));
    }
}
