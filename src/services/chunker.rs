//! Splits loaded text into overlapping chunks sized for the embedding model.

use crate::models::{ChunkingConfig, DocumentChunk, LoadedDocument};
use crate::utils::has_meaningful_content;

/// Text chunker that splits documents into overlapping chunks.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Characters shared by consecutive chunks
    overlap: usize,
}

impl TextChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        let chunk_size = config.chunk_size.max(1);
        Self {
            chunk_size,
            overlap: config.chunk_overlap.min(chunk_size / 2),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&ChunkingConfig::default())
    }

    /// Chunk every document, keeping document order.
    pub fn chunk_all(&self, documents: &[LoadedDocument]) -> Vec<DocumentChunk> {
        documents.iter().flat_map(|d| self.chunk(d)).collect()
    }

    /// Chunk a document into overlapping segments.
    pub fn chunk(&self, document: &LoadedDocument) -> Vec<DocumentChunk> {
        let content = document.content.trim();

        if content.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = content.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![DocumentChunk::from_document(
                document,
                content.to_string(),
                0,
                1,
                0,
                chars.len() as u64,
            )];
        }

        // Short fragments at break points carry no retrievable meaning.
        let spans: Vec<(usize, usize)> = self
            .spans(&chars)
            .into_iter()
            .filter(|&(start, end)| {
                has_meaningful_content(&chars[start..end].iter().collect::<String>())
            })
            .collect();

        let total_chunks = spans.len() as u32;
        spans
            .into_iter()
            .enumerate()
            .map(|(idx, (start, end))| {
                let text: String = chars[start..end].iter().collect();
                DocumentChunk::from_document(
                    document,
                    text.trim().to_string(),
                    idx as u32,
                    total_chunks,
                    start as u64,
                    end as u64,
                )
            })
            .collect()
    }

    /// Character spans of each chunk.
    fn spans(&self, chars: &[char]) -> Vec<(usize, usize)> {
        let total = chars.len();
        let mut spans = Vec::new();
        let mut start = 0;

        while start < total {
            let target_end = (start + self.chunk_size).min(total);
            let end = self.find_break_point(chars, start, target_end);
            spans.push((start, end));

            if end >= total {
                break;
            }

            // Step back by the overlap, but always make progress.
            start = end.saturating_sub(self.overlap).max(start + 1);
        }

        spans
    }

    /// Find a natural break point in the last fifth of the chunk.
    ///
    /// Priority: paragraph break, newline, sentence end, space.
    fn find_break_point(&self, chars: &[char], start: usize, target_end: usize) -> usize {
        if target_end >= chars.len() {
            return chars.len();
        }

        let search_start = target_end.saturating_sub(self.chunk_size / 5).max(start + 1);
        let mut paragraph = None;
        let mut newline = None;
        let mut sentence = None;
        let mut space = None;

        for pos in search_start..target_end {
            match chars[pos] {
                '\n' => {
                    if pos > 0 && chars[pos - 1] == '\n' {
                        paragraph = Some(pos + 1);
                    }
                    newline = Some(pos + 1);
                }
                '.' | '!' | '?' if chars.get(pos + 1).is_some_and(|c| c.is_whitespace()) => {
                    sentence = Some(pos + 1);
                }
                ' ' | '\t' => space = Some(pos + 1),
                _ => {}
            }
        }

        paragraph
            .or(newline)
            .or(sentence)
            .or(space)
            .unwrap_or(target_end)
    }
}
