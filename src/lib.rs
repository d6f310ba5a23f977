//! Serial-Binder: binds a paginated web serial into an ebook
//!
//! This crate walks a chain of chapter pages linked by "next" pointers,
//! extracts each chapter's title and body, localizes embedded images as
//! content-addressed resources, groups chapters into story arcs and hands
//! the resulting book to a document sink.

pub mod arc;
pub mod assembler;
pub mod config;
pub mod crawler;
pub mod model;
pub mod output;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Serial-Binder operations
///
/// Every variant is fatal: the pipeline aborts and no book is written.
#[derive(Debug, Error)]
pub enum BinderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request for {url} failed with HTTP status {status}")]
    Fetch { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Page {url} has no element matching '{selector}'")]
    Structure { url: String, selector: String },

    #[error("Cannot determine MIME type of image {url}")]
    MimeType { url: String },

    #[error("Chapter title '{title}' does not follow any known arc convention")]
    Classification { title: String },

    #[error("Crawl ended after {yielded} chapters but the index lists {expected}")]
    IncompleteCrawl { yielded: usize, expected: usize },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Serial-Binder operations
pub type Result<T> = std::result::Result<T, BinderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use arc::ArcClassifier;
pub use assembler::{assemble, assemble_with, ArcAccumulator, BookAssembler};
pub use config::Config;
pub use crawler::{CrawlSequencer, PageFetcher, RawPage};
pub use model::{Book, BookEntry, BookMetadata, Chapter, Resource, Section};
pub use output::{DocumentSink, EpubSink};

/// Runs the whole pipeline: crawl, assemble and write the book
///
/// The crawl is strictly sequential. Any fatal error aborts the run before
/// the sink is finalized, so no partial book is ever written.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written book
/// * `Err(BinderError)` - The run failed
pub async fn run(config: Config) -> Result<PathBuf> {
    let mut sequencer = CrawlSequencer::start(&config).await?;

    let metadata = BookMetadata::new(&config.book.title, &config.book.author)
        .with_language(&config.book.language);
    let assembler = BookAssembler::new(metadata, ArcAccumulator::from_config(&config.arcs));
    let book = assemble_with(&mut sequencer, assembler).await?;

    tracing::info!(
        "Assembled {} chapters in {} sections with {} resources",
        book.chapter_count(),
        book.entries().len(),
        book.resources().len()
    );

    let mut sink = match &config.book.stylesheet {
        Some(path) => EpubSink::with_stylesheet(std::fs::read(path)?),
        None => EpubSink::new(),
    };
    let path = book.publish(&mut sink, &config.book.output_path)?;

    tracing::info!("Book written to {}", path.display());
    Ok(path)
}
