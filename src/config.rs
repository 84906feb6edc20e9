use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for prompt-meta.
///
/// Controls how files are read, how form fields are pre-filled from the
/// extracted prompt, and what ends up in the output.
///
/// # Loading
///
/// ```rust,no_run
/// use prompt_meta::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.extraction.concurrency = 8;
/// config.prefill.title_max_chars = 40;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// File reading limits and parallelism.
    pub extraction: ExtractionConfig,
    /// Title/description derivation.
    pub prefill: PrefillConfig,
    /// Output behavior.
    pub output: OutputConfig,
}

/// File reading limits and parallelism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Files larger than this many bytes are rejected without being read.
    pub max_file_size: u64,
    /// Maximum number of files read and scanned at once.
    pub concurrency: usize,
}

/// Controls how form fields are derived from an extracted prompt.
///
/// # Example
///
/// ```rust
/// use prompt_meta::config::PrefillConfig;
///
/// let prefill = PrefillConfig {
///     title_max_chars: 50,
///     fallback_title: "Untitled".into(),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefillConfig {
    /// The title is taken from at most this many leading prompt characters.
    pub title_max_chars: usize,
    /// Title used when the prompt yields an empty one.
    pub fallback_title: String,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// If `true`, include the raw generation settings block in results.
    pub include_parameters: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            concurrency: 4,
        }
    }
}

impl Default for PrefillConfig {
    fn default() -> Self {
        Self {
            title_max_chars: 30,
            fallback_title: "AI Generated".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            prefill: PrefillConfig::default(),
            output: OutputConfig {
                include_parameters: true,
            },
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}
