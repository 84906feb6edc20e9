use thiserror::Error;

use crate::png::ChunkType;

/// Conditions met while walking a PNG buffer.
///
/// None of these abort an extraction: a [`FormatMismatch`](ScanError::FormatMismatch)
/// means there is nothing to read, a [`Truncated`](ScanError::Truncated) walk keeps
/// whatever was decoded before the damage, and an
/// [`UndecodableText`](ScanError::UndecodableText) record is simply skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("not a PNG stream (signature mismatch)")]
    FormatMismatch,

    #[error(
        "{kind} chunk at offset {offset} declares {length} bytes but only {available} remain"
    )]
    Truncated {
        offset: usize,
        kind: ChunkType,
        length: u32,
        available: usize,
    },

    #[error("{kind} chunk at offset {offset} skipped: {reason}")]
    UndecodableText {
        offset: usize,
        kind: ChunkType,
        reason: &'static str,
    },
}
