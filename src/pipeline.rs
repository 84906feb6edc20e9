use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::config::Config;
use crate::dialect::Metadata;
use crate::extract::extract;
use crate::prefill::Prefill;

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// The format of an image file, determined by its extension.
///
/// Every supported format is accepted for processing, but only PNG files can
/// carry generation metadata in text chunks. Other formats are detected by
/// their signature during extraction and yield no metadata.
///
/// # Example
///
/// ```rust
/// use prompt_meta::pipeline::ImageKind;
/// use std::path::Path;
///
/// let kind = ImageKind::from_path(Path::new("render.PNG"));
/// assert_eq!(kind, Some(ImageKind::Png));
///
/// let kind = ImageKind::from_path(Path::new("notes.txt"));
/// assert_eq!(kind, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageKind {
    /// Determine the image kind from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }
}

/// The result of extracting metadata from a single image file.
///
/// `metadata` is `None` both for files without generation metadata and for
/// files that could not be read; `error` tells the two apart.
///
/// # Example
///
/// ```rust,no_run
/// # use prompt_meta::pipeline::process_image;
/// # use prompt_meta::config::Config;
/// # async fn example() {
/// # let config = Config::default();
/// let result = process_image("render.png".as_ref(), &config).await;
///
/// if let Some(ref prefill) = result.prefill {
///     println!("Title: {}", prefill.title);
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct ProcessResult {
    pub path: PathBuf,
    /// The image kind detected from the file extension.
    pub image_kind: Option<ImageKind>,
    pub metadata: Option<Metadata>,
    pub prefill: Option<Prefill>,
    pub error: Option<String>,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            image_kind: ImageKind::from_path(path),
            metadata: None,
            prefill: None,
            error: None,
        }
    }
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks). Only files with supported image extensions
/// are included (see [`ImageKind`] for the full list).
///
/// # Example
///
/// ```rust,no_run
/// use prompt_meta::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("render.png"),      // single file
///     PathBuf::from("./outputs/"),      // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read a whole image file, refusing files over `max_size` bytes.
pub async fn read_image(path: &Path, max_size: u64) -> Result<Vec<u8>> {
    let meta = tokio::fs::metadata(path)
        .await
        .context("Failed to stat image file")?;
    if meta.len() > max_size {
        anyhow::bail!(
            "File is {} bytes, over the {} byte limit",
            meta.len(),
            max_size
        );
    }
    tokio::fs::read(path)
        .await
        .context("Failed to read image file")
}

/// Extract generation metadata from one image file.
///
/// Reads the file (subject to `extraction.max_file_size`), extracts the
/// canonical metadata and derives the pre-filled form fields from it.
pub async fn process_image(path: &Path, config: &Config) -> ProcessResult {
    let mut result = ProcessResult::new(path);

    let bytes = match read_image(path, config.extraction.max_file_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            result.error = Some(format!("{e:#}"));
            return result;
        }
    };

    let Some(mut metadata) = extract(&bytes) else {
        log::debug!("No generation metadata in {}", path.display());
        return result;
    };
    if !config.output.include_parameters {
        metadata.parameters = None;
    }

    log::debug!(
        "Found {:?} metadata in {}",
        metadata.dialect,
        path.display()
    );
    result.prefill = Some(Prefill::from_metadata(&metadata, &config.prefill));
    result.metadata = Some(metadata);
    result
}

/// Extract metadata from many files concurrently.
///
/// At most `extraction.concurrency` files are in flight at once. Results are
/// returned in the same order as `paths`.
pub async fn process_images(paths: &[PathBuf], config: &Config) -> Vec<ProcessResult> {
    let permits = Arc::new(Semaphore::new(config.extraction.concurrency.max(1)));
    let config = Arc::new(config.clone());
    let mut tasks = JoinSet::new();

    for (index, path) in paths.iter().cloned().enumerate() {
        let permits = Arc::clone(&permits);
        let config = Arc::clone(&config);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            (index, process_image(&path, &config).await)
        });
    }

    let mut slots: Vec<Option<ProcessResult>> = paths.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => log::error!("Extraction task failed: {e}"),
        }
    }

    slots
        .into_iter()
        .zip(paths)
        .map(|(slot, path)| {
            slot.unwrap_or_else(|| {
                let mut result = ProcessResult::new(path);
                result.error = Some("Extraction task failed".to_string());
                result
            })
        })
        .collect()
}
