//! Per-document vector index backed by USearch.
//!
//! An index is persisted as two artifacts next to the uploaded file: the
//! USearch graph (`index.usearch`) and a JSON sidecar (`index.json`) that
//! maps graph keys back to chunk text and sources.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::error::IndexError;
use crate::models::DocumentChunk;
use crate::models::storage_key::{INDEX_METADATA, INDEX_STRUCTURE};

/// Chunk text stored alongside the graph, addressed by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: String,
    pub content: String,
    pub source: String,
}

/// Sidecar metadata of a saved index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub dimensions: usize,
    pub embedding_model: String,
    pub chunks: Vec<StoredChunk>,
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub content: String,
    pub source: String,
    pub score: f32,
}

/// Saved form of an index, ready for upload.
#[derive(Debug, Clone)]
pub struct IndexArtifacts {
    pub structure: Vec<u8>,
    pub metadata: Vec<u8>,
}

pub struct VectorIndex {
    index: Index,
    metadata: IndexMetadata,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("dimensions", &self.metadata.dimensions)
            .field("embedding_model", &self.metadata.embedding_model)
            .field("chunks", &self.metadata.chunks.len())
            .finish()
    }
}

fn options(dimensions: usize) -> IndexOptions {
    IndexOptions {
        dimensions,
        metric: MetricKind::Cos,
        quantization: ScalarKind::F32,
        connectivity: 0,
        expansion_add: 0,
        expansion_search: 0,
        multi: false,
    }
}

fn backend<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> IndexError + '_ {
    move |e| IndexError::BackendError(format!("{context}: {e}"))
}

fn path_str(path: &Path) -> Result<&str, IndexError> {
    path.to_str()
        .ok_or_else(|| IndexError::BackendError(format!("invalid path: {}", path.display())))
}

impl VectorIndex {
    /// Build an index from embedded chunks. Every chunk must carry a
    /// vector of the same length.
    pub fn build(chunks: &[DocumentChunk], embedding_model: &str) -> Result<Self, IndexError> {
        let dimensions = chunks.first().ok_or(IndexError::Empty)?.dense_vector.len();
        if dimensions == 0 {
            return Err(IndexError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }

        let index = Index::new(&options(dimensions)).map_err(backend("failed to create index"))?;
        index
            .reserve(chunks.len())
            .map_err(backend("failed to reserve index capacity"))?;

        let mut stored = Vec::with_capacity(chunks.len());
        for (key, chunk) in chunks.iter().enumerate() {
            if chunk.dense_vector.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    actual: chunk.dense_vector.len(),
                });
            }
            index
                .add(key as u64, chunk.dense_vector.as_slice())
                .map_err(backend("failed to add vector"))?;
            stored.push(StoredChunk {
                id: chunk.id.clone(),
                content: chunk.content.clone(),
                source: chunk.source.clone(),
            });
        }

        info!(
            "Built vector index: {} chunks, {} dimensions",
            stored.len(),
            dimensions
        );

        Ok(Self {
            index,
            metadata: IndexMetadata {
                dimensions,
                embedding_model: embedding_model.to_string(),
                chunks: stored,
            },
        })
    }

    /// Serialize the index into its two artifacts.
    pub fn to_artifacts(&self) -> Result<IndexArtifacts, IndexError> {
        let dir = tempfile::tempdir()?;
        let structure_path = dir.path().join(INDEX_STRUCTURE);
        self.index
            .save(path_str(&structure_path)?)
            .map_err(backend("failed to save index"))?;

        Ok(IndexArtifacts {
            structure: std::fs::read(&structure_path)?,
            metadata: serde_json::to_vec(&self.metadata)?,
        })
    }

    /// Restore an index from the artifacts written by [`Self::to_artifacts`].
    pub fn from_artifacts(structure: &[u8], metadata: &[u8]) -> Result<Self, IndexError> {
        let metadata: IndexMetadata = serde_json::from_slice(metadata)?;

        let dir = tempfile::tempdir()?;
        let structure_path = dir.path().join(INDEX_STRUCTURE);
        std::fs::write(&structure_path, structure)?;

        let index =
            Index::new(&options(metadata.dimensions)).map_err(backend("failed to create index"))?;
        index
            .load(path_str(&structure_path)?)
            .map_err(backend("failed to load index"))?;

        if index.dimensions() != metadata.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: metadata.dimensions,
                actual: index.dimensions(),
            });
        }

        debug!(
            "Loaded vector index {} with {} chunks",
            INDEX_METADATA,
            metadata.chunks.len()
        );
        Ok(Self { index, metadata })
    }

    /// The `k` chunks closest to the query vector, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, IndexError> {
        if query.len() != self.metadata.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.metadata.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let matches = self
            .index
            .search(query, k)
            .map_err(backend("search failed"))?;

        Ok(matches
            .keys
            .iter()
            .zip(matches.distances.iter())
            .filter_map(|(&key, &distance)| {
                self.metadata
                    .chunks
                    .get(key as usize)
                    .map(|chunk| RetrievedChunk {
                        content: chunk.content.clone(),
                        source: chunk.source.clone(),
                        // Cosine distance to similarity
                        score: 1.0 - distance,
                    })
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.metadata.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimensions(&self) -> usize {
        self.metadata.dimensions
    }

    pub fn embedding_model(&self) -> &str {
        &self.metadata.embedding_model
    }
}
