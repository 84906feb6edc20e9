use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use prompt_meta::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "prompt-meta",
    version,
    about = "Read the prompts and settings that AI image generators embed in PNG files"
)]
struct Cli {
    /// Image files or directories to scan
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// List every chunk and text record in the image(s) and exit
    #[arg(long = "show-chunks")]
    show_chunks: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    let config = config::Config::load(cli.config.as_deref())?;

    // Handle --show-chunks
    if cli.show_chunks {
        for image_path in &images {
            print_chunks(image_path, &config).await?;
        }
        return Ok(());
    }

    log::info!("Found {} image(s) to scan", images.len());
    let results = pipeline::process_images(&images, &config).await;
    let total = results.len();

    if !cli.json {
        for (i, result) in results.iter().enumerate() {
            log::info!("[{}/{}] {}", i + 1, total, result.path.display());

            if let Some(ref err) = result.error {
                log::error!("  Error: {err}");
                continue;
            }
            let Some(ref metadata) = result.metadata else {
                log::info!("  No generation metadata");
                continue;
            };

            log::info!("  Dialect: {}", metadata.dialect.keyword());
            if let Some(ref prefill) = result.prefill {
                log::info!("  Title: {}", prefill.title);
            }
            log::info!("  Prompt: {}", metadata.prompt);
            if let Some(ref negative) = metadata.negative_prompt {
                log::info!("  Negative prompt: {negative}");
            }
            if let Some(ref parameters) = metadata.parameters {
                log::info!("  Settings: {parameters}");
            }
        }
    }

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "image_kind": r.image_kind,
                    "mime_type": r.image_kind.map(|k| k.mime_type()),
                    "metadata": r.metadata,
                    "prefill": r.prefill,
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let found = results.iter().filter(|r| r.metadata.is_some()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    log::info!(
        "Done: {found} with metadata, {} without, {failed} failed out of {total} images",
        total - found - failed
    );

    Ok(())
}

/// Print the chunk layout and decoded text records of one image.
async fn print_chunks(path: &Path, config: &config::Config) -> Result<()> {
    let bytes = pipeline::read_image(path, config.extraction.max_file_size)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let report = prompt_meta::scan(&bytes);

    println!("\n═══ {} ═══", path.display());

    if !report.chunks.is_empty() {
        println!("\n  {:<6} {:>10} {:>10}", "Chunk", "Offset", "Length");
        println!("  {}", "─".repeat(28));
        for chunk in &report.chunks {
            println!("  {:<6} {:>10} {:>10}", chunk.kind.to_string(), chunk.offset, chunk.length);
        }
    }

    if !report.records.is_empty() {
        println!("\n  Text records:");
        for record in &report.records {
            println!("  {:<16} {}", record.keyword, truncate(&record.value, 60));
        }
    }

    for err in &report.errors {
        println!("\n  ! {err}");
    }

    match report.metadata {
        Some(ref metadata) => println!("\n  Metadata: {} dialect", metadata.dialect.keyword()),
        None => println!("\n  Metadata: none"),
    }

    Ok(())
}

/// Shorten a value to one line of at most `max` characters.
fn truncate(value: &str, max: usize) -> String {
    let line = value.lines().next().unwrap_or_default();
    if line.chars().count() > max || line.len() < value.len() {
        let head: String = line.chars().take(max).collect();
        format!("{head}…")
    } else {
        line.to_string()
    }
}
