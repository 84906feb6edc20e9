use serde::Serialize;

use crate::config::PrefillConfig;
use crate::dialect::Metadata;

/// Form fields pre-filled from extracted metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prefill {
    pub title: String,
    pub description: String,
}

impl Prefill {
    /// The description is the full prompt; the title is derived with [`derive_title`].
    pub fn from_metadata(metadata: &Metadata, config: &PrefillConfig) -> Self {
        Self {
            title: derive_title(&metadata.prompt, config),
            description: metadata.prompt.clone(),
        }
    }
}

/// Short title from a prompt: the first `title_max_chars` characters, cut at
/// the first comma and trimmed. Falls back to `fallback_title` when nothing
/// is left.
///
/// ```rust
/// use prompt_meta::config::PrefillConfig;
/// use prompt_meta::prefill::derive_title;
///
/// let config = PrefillConfig::default();
/// assert_eq!(derive_title("a red fox, snow, dusk", &config), "a red fox");
/// assert_eq!(derive_title(", , ,", &config), "AI Generated");
/// ```
pub fn derive_title(prompt: &str, config: &PrefillConfig) -> String {
    let head: String = prompt.chars().take(config.title_max_chars).collect();
    let title = head.split(',').next().unwrap_or_default().trim();
    if title.is_empty() {
        config.fallback_title.clone()
    } else {
        title.to_string()
    }
}
