use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::FusedIterator;

use crate::error::ScanError;

/// The 8-byte PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

// length (4) + type (4)
const CHUNK_HEADER_LEN: usize = 8;
// CRC trailer, never inspected
const CHUNK_TRAILER_LEN: usize = 4;

/// A 4-byte chunk type tag such as `IHDR` or `tEXt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const IDAT: Self = Self(*b"IDAT");
    pub const IEND: Self = Self(*b"IEND");
    /// Uncompressed Latin-1 text.
    pub const TEXT: Self = Self(*b"tEXt");
    /// International (UTF-8) text, optionally compressed.
    pub const ITXT: Self = Self(*b"iTXt");
    /// Compressed Latin-1 text.
    pub const ZTXT: Self = Self(*b"zTXt");

    /// Whether the chunk carries a keyword/value text record.
    pub fn is_text(&self) -> bool {
        matches!(*self, Self::TEXT | Self::ITXT | Self::ZTXT)
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() { b as char } else { '?' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Serialize for ChunkType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One chunk borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub kind: ChunkType,
    /// Offset of the chunk's length field from the start of the buffer.
    pub offset: usize,
    pub payload: &'a [u8],
}

/// Check whether `data` starts with the PNG signature.
pub fn has_signature(data: &[u8]) -> bool {
    data.starts_with(&SIGNATURE)
}

/// Forward-only reader over a byte slice. Every read is bounds-checked and
/// leaves the position untouched when it fails.
#[derive(Debug, Clone)]
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N)?.try_into().ok()
    }

    fn read_u32_be(&mut self) -> Option<u32> {
        self.read_array::<4>().map(u32::from_be_bytes)
    }

    fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }
}

/// Lazy, single-pass iterator over the chunks of a PNG buffer.
///
/// Yields `Ok(chunk)` for every complete chunk. A chunk whose declared length
/// runs past the end of the buffer yields one `Err(ScanError::Truncated)` and
/// ends the walk. The walk also ends after `IEND` or when fewer than 8 bytes
/// remain for the next chunk header.
///
/// ```rust
/// use prompt_meta::png::{ChunkType, Chunks};
///
/// let mut png = prompt_meta::png::SIGNATURE.to_vec();
/// png.extend_from_slice(&0u32.to_be_bytes());
/// png.extend_from_slice(b"IEND");
/// png.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);
///
/// let kinds: Vec<ChunkType> = Chunks::new(&png)
///     .unwrap()
///     .filter_map(Result::ok)
///     .map(|c| c.kind)
///     .collect();
/// assert_eq!(kinds, vec![ChunkType::IEND]);
/// ```
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> Chunks<'a> {
    /// Start a walk over `data`, failing if it does not begin with [`SIGNATURE`].
    pub fn new(data: &'a [u8]) -> Result<Self, ScanError> {
        if !has_signature(data) {
            return Err(ScanError::FormatMismatch);
        }
        Ok(Self {
            cursor: Cursor::new(data, SIGNATURE.len()),
            done: false,
        })
    }

    fn halt(&mut self) -> Option<<Self as Iterator>::Item> {
        self.done = true;
        None
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor.remaining() < CHUNK_HEADER_LEN {
            return self.halt();
        }

        let offset = self.cursor.pos;
        let Some(length) = self.cursor.read_u32_be() else {
            return self.halt();
        };
        let Some(tag) = self.cursor.read_array::<4>() else {
            return self.halt();
        };
        let kind = ChunkType(tag);

        let payload = usize::try_from(length)
            .ok()
            .and_then(|n| self.cursor.take(n));
        let Some(payload) = payload else {
            self.done = true;
            return Some(Err(ScanError::Truncated {
                offset,
                kind,
                length,
                available: self.cursor.remaining(),
            }));
        };

        self.cursor.skip(CHUNK_TRAILER_LEN);
        if kind == ChunkType::IEND {
            self.done = true;
        }

        Some(Ok(Chunk {
            kind,
            offset,
            payload,
        }))
    }
}

impl FusedIterator for Chunks<'_> {}
