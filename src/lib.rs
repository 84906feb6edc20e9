//! # prompt-meta
//!
//! Recover the prompt an AI image generator embedded in a PNG file.
//!
//! Generators store their settings as PNG text chunks, in one of two dialects:
//! an AUTOMATIC1111-style `parameters` block (prompt, negative prompt, settings
//! line) or a ComfyUI-style `prompt` record. This crate walks the chunk stream,
//! decodes the text records and normalizes either dialect into one
//! [`Metadata`] record.
//!
//! ## Quick Start
//!
//! The core is a pure function from bytes to an optional record:
//!
//! ```rust,no_run
//! fn main() -> anyhow::Result<()> {
//!     let bytes = std::fs::read("render.png")?;
//!
//!     match prompt_meta::extract(&bytes) {
//!         Some(meta) => {
//!             println!("Prompt: {}", meta.prompt);
//!             if let Some(ref negative) = meta.negative_prompt {
//!                 println!("Negative prompt: {negative}");
//!             }
//!         }
//!         None => println!("No generation metadata"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Processing Files
//!
//! The pipeline module reads files (with a size limit), extracts metadata
//! concurrently and derives pre-filled form fields:
//!
//! ```rust,no_run
//! use prompt_meta::config::Config;
//! use prompt_meta::pipeline::{collect_images, process_images};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let images = collect_images(&[PathBuf::from("./outputs")]);
//!
//!     for result in process_images(&images, &config).await {
//!         if let Some(ref prefill) = result.prefill {
//!             println!("{}: {}", result.path.display(), prefill.title);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Behavior
//!
//! Extraction never fails. Non-PNG input, chunks that run past the end of the
//! buffer, text records without a keyword separator and files without a
//! recognized keyword all end in `None` (or in the records recovered before
//! the damage). Use [`scan`] to see what was skipped and why.
//!
//! ## Modules
//!
//! - [`png`] — chunk walker and text record decoder
//! - [`dialect`] — dialect detection and normalization
//! - [`extract`](mod@extract) — bytes → metadata entry points
//! - [`prefill`] — title/description derivation from a record
//! - [`config`] — configuration types and loading/saving
//! - [`pipeline`] — image collection and file processing

pub mod config;
pub mod dialect;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod png;
pub mod prefill;

pub use dialect::{Dialect, Metadata};
pub use error::ScanError;
pub use extract::{extract, scan, ScanReport};
