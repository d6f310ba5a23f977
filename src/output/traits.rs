//! Document sink trait and associated error types
//!
//! A sink receives a finished book piece by piece and serializes it to some
//! container format. It owns identifier generation and manifest bookkeeping;
//! callers only supply content in reading order.

use crate::model::{BookMetadata, Chapter, Resource};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Chapter title used twice: {0}")]
    DuplicateChapter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Consumer of an assembled book
///
/// Calls arrive in this order: `set_metadata` once, `add_resource` for every
/// resource, `add_chapter` / `add_section` in reading order, then `finalize`.
pub trait DocumentSink {
    /// Records the book's title, language and author
    fn set_metadata(&mut self, metadata: &BookMetadata) -> OutputResult<()>;

    /// Adds a binary resource; a filename already added is ignored
    fn add_resource(&mut self, resource: &Resource) -> OutputResult<()>;

    /// Adds a top-level chapter to the reading order and contents
    fn add_chapter(&mut self, chapter: &Chapter) -> OutputResult<()>;

    /// Adds a named section holding the given chapters
    fn add_section(&mut self, name: &str, chapters: &[Chapter]) -> OutputResult<()>;

    /// Serializes everything added so far to `path`
    ///
    /// # Returns
    ///
    /// The path of the written file
    fn finalize(&mut self, path: &Path) -> OutputResult<PathBuf>;
}
