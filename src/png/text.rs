use serde::Serialize;

use super::chunks::{Chunk, ChunkType};
use crate::error::ScanError;

/// A keyword/value pair decoded from a `tEXt` or `iTXt` chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRecord {
    pub keyword: String,
    pub value: String,
}

impl TextRecord {
    /// Decode the text record carried by `chunk`.
    ///
    /// `tEXt` is `keyword NUL value`. `iTXt` is `keyword NUL flag method
    /// language NUL translated-keyword NUL value`; only the keyword and the
    /// final value are kept. Compressed text (`zTXt`, or `iTXt` with the
    /// compression flag set) is not inflated and is reported as undecodable.
    pub fn decode(chunk: &Chunk<'_>) -> Result<Self, ScanError> {
        let undecodable = |reason: &'static str| ScanError::UndecodableText {
            offset: chunk.offset,
            kind: chunk.kind,
            reason,
        };

        match chunk.kind {
            ChunkType::TEXT => decode_text(chunk.payload)
                .ok_or_else(|| undecodable("missing keyword separator")),
            ChunkType::ITXT => decode_itxt(chunk.payload).map_err(undecodable),
            ChunkType::ZTXT => Err(undecodable("compressed text is not supported")),
            _ => Err(undecodable("not a text chunk")),
        }
    }
}

fn decode_text(payload: &[u8]) -> Option<TextRecord> {
    let (keyword, value) = split_nul(payload)?;
    Some(TextRecord {
        keyword: decode_str(keyword),
        value: decode_str(value),
    })
}

fn decode_itxt(payload: &[u8]) -> Result<TextRecord, &'static str> {
    let (keyword, rest) = split_nul(payload).ok_or("missing keyword separator")?;
    let [flag, _method, rest @ ..] = rest else {
        return Err("missing compression fields");
    };
    if *flag != 0 {
        return Err("compressed text is not supported");
    }
    let (_language, rest) = split_nul(rest).ok_or("missing language tag separator")?;
    let (_translated, value) =
        split_nul(rest).ok_or("missing translated keyword separator")?;

    Ok(TextRecord {
        keyword: decode_str(keyword),
        value: decode_str(value),
    })
}

/// Split at the first NUL byte, dropping the separator.
fn split_nul(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
    let nul = bytes.iter().position(|&b| b == 0)?;
    Some((&bytes[..nul], &bytes[nul + 1..]))
}

/// UTF-8 when valid, Latin-1 otherwise.
fn decode_str(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
