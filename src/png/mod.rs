//! PNG container reading.
//!
//! Two layers, used bottom-up:
//!
//! - [`Chunks`] — walks the length-prefixed, type-tagged chunk stream after the
//!   8-byte signature, stopping at `IEND`, at the end of the buffer, or at the
//!   first chunk whose declared length runs past the buffer.
//! - [`TextRecord`] — decodes the keyword/value pair carried by `tEXt` and
//!   `iTXt` chunks.
//!
//! Nothing here verifies CRCs or interprets image data.

mod chunks;
mod text;

pub use chunks::{has_signature, Chunk, ChunkType, Chunks, SIGNATURE};
pub use text::TextRecord;
