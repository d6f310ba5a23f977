//! Output module for writing assembled books
//!
//! This module handles:
//! - The document sink contract the assembled book is streamed into
//! - Packaging a book as an EPUB 3 archive

mod epub;
mod traits;

pub use epub::{EpubSink, DEFAULT_STYLESHEET};
pub use traits::{DocumentSink, OutputError, OutputResult};
