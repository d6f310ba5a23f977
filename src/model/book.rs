use crate::model::{Chapter, Resource};
use crate::output::{DocumentSink, OutputResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Descriptive metadata handed to the sink before any content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub language: String,
}

impl BookMetadata {
    pub fn new(title: &str, author: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            language: "en".to_string(),
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }
}

/// A named, non-empty run of chapters in the table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    chapters: Vec<Chapter>,
}

impl Section {
    /// Creates a section, or `None` when there are no chapters to hold
    pub fn new(name: impl Into<String>, chapters: Vec<Chapter>) -> Option<Self> {
        if chapters.is_empty() {
            return None;
        }

        Some(Self {
            name: name.into(),
            chapters,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }
}

/// One top-level table-of-contents entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookEntry {
    Chapter(Chapter),
    Section(Section),
}

impl BookEntry {
    pub fn chapter_count(&self) -> usize {
        match self {
            Self::Chapter(_) => 1,
            Self::Section(section) => section.chapters.len(),
        }
    }
}

/// The ordered book: entries in crawl order plus the resources they reference
#[derive(Debug, Clone)]
pub struct Book {
    metadata: BookMetadata,
    entries: Vec<BookEntry>,
    resources: Vec<Resource>,
    resource_index: HashMap<String, usize>,
}

impl Book {
    pub fn new(metadata: BookMetadata) -> Self {
        Self {
            metadata,
            entries: Vec::new(),
            resources: Vec::new(),
            resource_index: HashMap::new(),
        }
    }

    pub fn metadata(&self) -> &BookMetadata {
        &self.metadata
    }

    pub fn entries(&self) -> &[BookEntry] {
        &self.entries
    }

    /// Resources in the order they were first registered
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn chapter_count(&self) -> usize {
        self.entries.iter().map(BookEntry::chapter_count).sum()
    }

    pub fn push_chapter(&mut self, chapter: Chapter) {
        self.entries.push(BookEntry::Chapter(chapter));
    }

    pub fn push_section(&mut self, section: Section) {
        self.entries.push(BookEntry::Section(section));
    }

    /// Registers a resource, keyed by its filename
    ///
    /// Returns `false` when a resource with the same filename is already
    /// present; the existing one is kept.
    pub fn register_resource(&mut self, resource: Resource) -> bool {
        if let Some(&index) = self.resource_index.get(resource.filename()) {
            let existing = &self.resources[index];
            if existing.mime_type() != resource.mime_type() {
                tracing::warn!(
                    "Resource {} re-registered as {} (kept {})",
                    resource.filename(),
                    resource.mime_type(),
                    existing.mime_type()
                );
            }
            return false;
        }

        self.resource_index
            .insert(resource.filename().to_string(), self.resources.len());
        self.resources.push(resource);
        true
    }

    /// Streams the book into a document sink and finalizes it at `path`
    ///
    /// Calls happen in the order the sink contract requires: metadata, every
    /// resource, every entry in crawl order, then `finalize`.
    pub fn publish<S: DocumentSink>(&self, sink: &mut S, path: &Path) -> OutputResult<PathBuf> {
        sink.set_metadata(&self.metadata)?;

        for resource in &self.resources {
            sink.add_resource(resource)?;
        }

        for entry in &self.entries {
            match entry {
                BookEntry::Chapter(chapter) => sink.add_chapter(chapter)?,
                BookEntry::Section(section) => sink.add_section(section.name(), section.chapters())?,
            }
        }

        sink.finalize(path)
    }
}
