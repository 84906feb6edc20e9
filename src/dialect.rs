//! Recognition of AI-generation metadata dialects.
//!
//! Image generators embed their settings as PNG text records under different
//! keywords. Two conventions are recognized:
//!
//! | Keyword      | Written by                | Value                                        |
//! |--------------|---------------------------|----------------------------------------------|
//! | `parameters` | AUTOMATIC1111 and forks   | prompt, `Negative prompt:` line, setting list |
//! | `prompt`     | ComfyUI                   | workflow prompt, kept verbatim               |
//!
//! [`Normalizer`] collects at most one candidate per dialect and resolves them
//! into a single [`Metadata`] record once every text record has been seen.
//! `parameters` always wins over `prompt`, whichever comes first in the file.

use serde::Serialize;

use crate::png::TextRecord;

const NEGATIVE_PROMPT_PREFIX: &str = "Negative prompt:";
const SETTINGS_PREFIXES: &[&str] = &["Steps:", "Size:"];

/// A recognized metadata dialect, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// A1111-style `parameters` text block.
    Parameters,
    /// ComfyUI-style `prompt` record.
    Prompt,
}

impl Dialect {
    /// All dialects, highest precedence first.
    pub const ALL: [Dialect; 2] = [Dialect::Parameters, Dialect::Prompt];

    /// The text record keyword that carries this dialect.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Parameters => "parameters",
            Self::Prompt => "prompt",
        }
    }

    /// Look up the dialect carried under `keyword`. Matching is exact.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.keyword() == keyword)
    }

    /// Parse a record value into canonical metadata. Returns `None` when no
    /// positive prompt can be recovered.
    pub fn parse(self, value: &str) -> Option<Metadata> {
        match self {
            Self::Parameters => parse_parameters(value),
            Self::Prompt => parse_prompt(value),
        }
    }
}

/// Canonical generation metadata, whichever dialect it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Positive prompt. Never empty.
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    /// Raw generation settings (`Steps: 20, Sampler: ...`), unparsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    pub dialect: Dialect,
}

/// Parse an A1111 `parameters` block.
///
/// Lines accumulate into the prompt until a `Negative prompt:` line, after
/// which they accumulate into the negative prompt. A line starting with
/// `Steps:` or `Size:` ends both; it and everything after it is kept raw in
/// [`Metadata::parameters`].
///
/// ```rust
/// use prompt_meta::dialect::parse_parameters;
///
/// let text = "A cat\nNegative prompt: blurry\nSteps: 20, Sampler: Euler";
/// let meta = parse_parameters(text).unwrap();
/// assert_eq!(meta.prompt, "A cat");
/// assert_eq!(meta.negative_prompt.as_deref(), Some("blurry"));
/// assert_eq!(meta.parameters.as_deref(), Some("Steps: 20, Sampler: Euler"));
/// ```
pub fn parse_parameters(text: &str) -> Option<Metadata> {
    let mut prompt: Vec<&str> = Vec::new();
    let mut negative: Option<Vec<&str>> = None;
    let mut settings = None;

    let mut start = 0;
    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if SETTINGS_PREFIXES.iter().any(|p| line.starts_with(p)) {
            settings = Some(&text[start..]);
            break;
        }
        start += raw.len() + 1;

        if let Some(rest) = line.strip_prefix(NEGATIVE_PROMPT_PREFIX) {
            negative.get_or_insert_with(Vec::new).push(rest);
        } else if let Some(lines) = negative.as_mut() {
            lines.push(line);
        } else {
            prompt.push(line);
        }
    }

    let prompt = prompt.join("\n").trim().to_string();
    if prompt.is_empty() {
        return None;
    }

    Some(Metadata {
        prompt,
        negative_prompt: negative.and_then(|lines| non_empty(&lines.join("\n"))),
        parameters: settings.and_then(non_empty),
        dialect: Dialect::Parameters,
    })
}

/// A ComfyUI `prompt` value is taken as-is.
fn parse_prompt(value: &str) -> Option<Metadata> {
    if value.trim().is_empty() {
        return None;
    }
    Some(Metadata {
        prompt: value.to_string(),
        negative_prompt: None,
        parameters: None,
        dialect: Dialect::Prompt,
    })
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Collects dialect candidates from a stream of text records.
///
/// Each dialect keeps the outcome of its first record; later records of the
/// same dialect are ignored. [`finish`](Self::finish) resolves by precedence:
/// once a `parameters` record has been seen its outcome is final, even when it
/// held no usable prompt, so the result does not depend on chunk order.
#[derive(Debug, Default)]
pub struct Normalizer {
    // Outer `Some` once a record of the dialect was seen.
    parameters: Option<Option<Metadata>>,
    prompt: Option<Option<Metadata>>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, dialect: Dialect) -> &mut Option<Option<Metadata>> {
        match dialect {
            Dialect::Parameters => &mut self.parameters,
            Dialect::Prompt => &mut self.prompt,
        }
    }

    /// Offer a decoded text record. Records with unrecognized keywords are ignored.
    pub fn push(&mut self, record: &TextRecord) {
        let Some(dialect) = Dialect::from_keyword(&record.keyword) else {
            return;
        };

        let slot = self.slot(dialect);
        if slot.is_some() {
            log::debug!("Ignoring repeated '{}' record", dialect.keyword());
            return;
        }

        let parsed = dialect.parse(&record.value);
        if parsed.is_none() {
            log::debug!("'{}' record has no usable prompt", dialect.keyword());
        }
        *slot = Some(parsed);
    }

    /// Resolve the candidates into at most one record.
    pub fn finish(self) -> Option<Metadata> {
        match self.parameters {
            Some(parameters) => parameters,
            None => self.prompt.flatten(),
        }
    }
}
