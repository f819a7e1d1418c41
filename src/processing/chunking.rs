//! Fixed-size word chunking.
//!
//! Text is tokenized on Unicode whitespace and split into consecutive, non-overlapping groups of
//! `chunk_size` words. Each group is rejoined with single spaces, so original line breaks and
//! repeated spaces are not preserved inside a chunk.

use super::types::{ChunkingError, TextChunk};

/// Words per chunk when `RAG_CHUNK_SIZE` is not set.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Split `text` into chunks of at most `chunk_size` words.
///
/// Produces `ceil(word_count / chunk_size)` chunks; only the last one may be shorter. Empty or
/// whitespace-only text yields an empty vector, so callers must reject empty documents first.
pub fn chunk_words(text: &str, chunk_size: usize) -> Result<Vec<TextChunk>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    Ok(words
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, group)| TextChunk {
            index,
            text: group.join(" "),
        })
        .collect())
}
