//! Response chunking for Discord messages
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Fixed-size character segments; drop embed helpers and truncation
//! - 1.0.0: Line-aware chunking for message and embed limits

/// Discord message content limit, in characters
pub const MESSAGE_LIMIT: usize = 2000;

/// Split text into segments of at most `max_chars` characters.
///
/// Segments are cut on `char` boundaries, so multi-byte characters are never split
/// and the segments concatenate back to the input. Empty input yields no segments.
/// A `max_chars` of zero is treated as one.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Chunk text for message content (2000 character limit)
pub fn chunk_for_message(text: &str) -> Vec<String> {
    chunk_text(text, MESSAGE_LIMIT)
}
