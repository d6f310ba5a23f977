//! Book assembly from the crawled chapter stream
//!
//! The assembler pulls pages from a [`CrawlSequencer`] one at a time, extracts
//! each chapter, registers the resources it found and feeds the chapter to an
//! [`ArcAccumulator`]. Closed arcs become sections of the [`Book`]. The
//! grouping state lives in the accumulator, so it can be driven from a
//! synthetic stream without any network access.

mod accumulator;

pub use accumulator::ArcAccumulator;

use crate::crawler::{CrawlSequencer, ExtractedChapter};
use crate::model::{Book, BookMetadata};
use crate::Result;

/// Builds a [`Book`] from extracted chapters in crawl order
#[derive(Debug, Clone)]
pub struct BookAssembler {
    book: Book,
    arcs: ArcAccumulator,
}

impl BookAssembler {
    pub fn new(metadata: BookMetadata, arcs: ArcAccumulator) -> Self {
        Self {
            book: Book::new(metadata),
            arcs,
        }
    }

    /// Adds one chapter tagged with its arc label
    pub fn push(&mut self, arc: &str, extracted: ExtractedChapter) {
        for resource in extracted.resources {
            let filename = resource.filename().to_string();
            if self.book.register_resource(resource) {
                tracing::debug!("Registered resource {}", filename);
            }
        }

        if let Some(section) = self.arcs.push(arc, extracted.chapter) {
            tracing::info!(
                "Closed arc '{}' with {} chapters",
                section.name(),
                section.chapters().len()
            );
            self.book.push_section(section);
        }
    }

    /// Closes the last arc and returns the finished book
    pub fn finish(mut self) -> Book {
        if let Some(section) = self.arcs.finish() {
            tracing::info!(
                "Closed arc '{}' with {} chapters",
                section.name(),
                section.chapters().len()
            );
            self.book.push_section(section);
        }
        self.book
    }
}

/// Crawls the whole serial and assembles it with the default arc rules
pub async fn assemble(sequencer: &mut CrawlSequencer, metadata: BookMetadata) -> Result<Book> {
    assemble_with(sequencer, BookAssembler::new(metadata, ArcAccumulator::default())).await
}

/// Crawls the whole serial into the given assembler
///
/// Any error from fetching, extraction or classification aborts assembly;
/// no partial book is returned.
pub async fn assemble_with(
    sequencer: &mut CrawlSequencer,
    mut assembler: BookAssembler,
) -> Result<Book> {
    while let Some(page) = sequencer.next_page().await? {
        tracing::info!(
            "[{}/{}] {}",
            sequencer.yielded(),
            sequencer.expected(),
            page.title()
        );

        let arc = page.arc().to_string();
        let extracted = page
            .into_extracted(sequencer.extractor(), sequencer.fetcher())
            .await?;
        assembler.push(&arc, extracted);
    }

    Ok(assembler.finish())
}
