//! Value types shared by the crawler, the assembler and the sinks
//!
//! Chapters and resources are created while a single page is extracted and are
//! immutable afterwards. The [`Book`] owns them until it is published.

mod book;
mod chapter;
mod resource;

pub use book::{Book, BookEntry, BookMetadata, Section};
pub use chapter::{escape_markup, Chapter, TitleBanner};
pub use resource::{extension_of, guess_mime_type, Resource, RESOURCE_DIR};
