//! Synthetic PNG construction for integration tests.

use prompt_meta::png::SIGNATURE;

/// Chunk CRC over type and payload, as PNG stores it.
fn chunk_crc(kind: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(payload);
    hasher.finalize()
}

/// Builds a PNG byte stream chunk by chunk. Starts with the signature and an
/// IHDR for a 1x1 RGBA image.
pub struct PngBuilder {
    bytes: Vec<u8>,
}

impl PngBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            bytes: SIGNATURE.to_vec(),
        };
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&1u32.to_be_bytes());
        ihdr.extend_from_slice(&1u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);
        builder.chunk(b"IHDR", &ihdr)
    }

    pub fn chunk(mut self, kind: &[u8; 4], payload: &[u8]) -> Self {
        self.bytes
            .extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.bytes.extend_from_slice(kind);
        self.bytes.extend_from_slice(payload);
        self.bytes
            .extend_from_slice(&chunk_crc(kind, payload).to_be_bytes());
        self
    }

    pub fn text(self, keyword: &str, value: &str) -> Self {
        let payload = [keyword.as_bytes(), b"\0", value.as_bytes()].concat();
        self.chunk(b"tEXt", &payload)
    }

    pub fn itxt(self, keyword: &str, language: &str, translated: &str, value: &str) -> Self {
        let payload = [
            keyword.as_bytes(),
            b"\0\0\0",
            language.as_bytes(),
            b"\0",
            translated.as_bytes(),
            b"\0",
            value.as_bytes(),
        ]
        .concat();
        self.chunk(b"iTXt", &payload)
    }

    pub fn idat(self) -> Self {
        self.chunk(b"IDAT", &[0x78, 0x9C, 0x63, 0x60, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01])
    }

    /// Append IEND and return the bytes.
    pub fn finish(self) -> Vec<u8> {
        self.chunk(b"IEND", &[]).bytes
    }

    /// Return the bytes without an IEND chunk.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[test]
fn crc_matches_known_iend() {
    assert_eq!(chunk_crc(b"IEND", b""), 0xAE42_6082);
}
