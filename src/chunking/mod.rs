//! Sentence-based text chunking.
//!
//! Splits raw text into bounded-size chunks along sentence boundaries so that
//! each chunk stays a coherent unit for embedding and retrieval.

/// Split text into chunks of roughly `max_size` characters.
///
/// Sentences are detected on runs of `.`, `!` and `?`. Each sentence is
/// re-terminated with `". "` regardless of its original punctuation. When
/// appending a sentence would push the current chunk past `max_size`, the
/// chunk is flushed and the sentence starts a fresh one; a single sentence
/// longer than `max_size` still becomes its own (oversized) chunk.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();

    for sentence in text.split(['.', '!', '?']) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if !buffer.is_empty() && buffer.len() + sentence.len() > max_size {
            chunks.push(buffer.trim().to_string());
            buffer.clear();
        }

        buffer.push_str(sentence);
        buffer.push_str(". ");
    }

    if !buffer.is_empty() {
        chunks.push(buffer.trim().to_string());
    }

    chunks
}
