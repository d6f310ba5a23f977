//! Crawler module for walking the serial and extracting chapters
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of pages and images
//! - Chapter extraction and cleanup
//! - XHTML serialization of chapter content
//! - Sequencing the crawl along "next" links

mod extractor;
mod fetcher;
mod markup;
mod sequencer;

pub use extractor::{ChapterExtractor, ExtractedChapter};
pub use fetcher::{build_http_client, PageFetcher};
pub use markup::{image_sources, serialize_children};
pub use sequencer::{count_expected_chapters, CrawlSequencer, RawPage};
