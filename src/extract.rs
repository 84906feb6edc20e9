use serde::Serialize;

use crate::dialect::{Metadata, Normalizer};
use crate::error::ScanError;
use crate::png::{Chunk, ChunkType, Chunks, TextRecord};

/// Summary of one chunk seen during a [`scan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkSummary {
    pub kind: ChunkType,
    pub offset: usize,
    pub length: usize,
}

/// Everything observed while extracting metadata from one buffer.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Every complete chunk, in file order.
    pub chunks: Vec<ChunkSummary>,
    /// Every text record that decoded, in file order.
    pub records: Vec<TextRecord>,
    /// Conditions that skipped a record or ended the walk early.
    pub errors: Vec<ScanError>,
    pub metadata: Option<Metadata>,
}

impl ScanReport {
    /// Whether the walk stopped on a chunk that ran past the end of the buffer.
    pub fn truncated(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, ScanError::Truncated { .. }))
    }
}

/// Extract AI-generation metadata from a PNG buffer.
///
/// Never fails: non-PNG input, damaged chunks, undecodable text and files
/// without a recognized keyword all yield `None`. A truncated file still
/// yields whatever was recoverable before the damage.
///
/// ```rust
/// let not_png = b"\xFF\xD8\xFF\xE0 definitely a jpeg";
/// assert!(prompt_meta::extract(not_png).is_none());
/// ```
pub fn extract(data: &[u8]) -> Option<Metadata> {
    walk(data, None)
}

/// Like [`extract`], but also report the chunks, text records and errors seen.
pub fn scan(data: &[u8]) -> ScanReport {
    let mut report = ScanReport::default();
    let metadata = walk(data, Some(&mut report));
    report.metadata = metadata;
    report
}

fn walk(data: &[u8], mut report: Option<&mut ScanReport>) -> Option<Metadata> {
    let chunks = match Chunks::new(data) {
        Ok(chunks) => chunks,
        Err(e) => {
            log::debug!("{e}");
            if let Some(report) = report {
                report.errors.push(e);
            }
            return None;
        }
    };

    let mut normalizer = Normalizer::new();
    for item in chunks {
        let chunk = match item {
            Ok(chunk) => chunk,
            Err(e) => {
                log::debug!("Stopping chunk walk: {e}");
                if let Some(report) = report.as_deref_mut() {
                    report.errors.push(e);
                }
                break;
            }
        };

        if let Some(report) = report.as_deref_mut() {
            report.chunks.push(summarize(&chunk));
        }
        if !chunk.kind.is_text() {
            continue;
        }

        match TextRecord::decode(&chunk) {
            Ok(record) => {
                log::trace!("{} record '{}'", chunk.kind, record.keyword);
                normalizer.push(&record);
                if let Some(report) = report.as_deref_mut() {
                    report.records.push(record);
                }
            }
            Err(e) => {
                log::debug!("{e}");
                if let Some(report) = report.as_deref_mut() {
                    report.errors.push(e);
                }
            }
        }
    }

    normalizer.finish()
}

fn summarize(chunk: &Chunk<'_>) -> ChunkSummary {
    ChunkSummary {
        kind: chunk.kind,
        offset: chunk.offset,
        length: chunk.payload.len(),
    }
}
