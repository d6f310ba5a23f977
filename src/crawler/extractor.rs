//! Chapter extraction from fetched pages
//!
//! Given a chapter page, this module:
//! - Locates the title and content container via configured selectors
//! - Removes chapter navigation links and post flair from the content
//! - Downloads every embedded image and turns it into a [`Resource`]
//! - Serializes the cleaned content with image sources pointing at the
//!   resources' filenames
//!
//! A page missing the title or content element no longer matches the
//! expected template; that is reported as a structure error, never skipped.

use crate::config::{compile_pattern, parse_selector, SourceConfig};
use crate::crawler::markup::{image_sources, serialize_children};
use crate::crawler::PageFetcher;
use crate::model::{extension_of, guess_mime_type, Chapter, Resource};
use crate::{BinderError, ConfigResult, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A fully extracted chapter together with the resources it references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedChapter {
    pub chapter: Chapter,
    pub resources: Vec<Resource>,
}

/// Compiled selectors and patterns describing the source page template
#[derive(Debug, Clone)]
pub struct ChapterExtractor {
    source: SourceConfig,
    title: Selector,
    content: Selector,
    next: Selector,
    noise: Selector,
    link: Selector,
    navigation_link: Regex,
}

impl ChapterExtractor {
    /// Compiles the page template from the source configuration
    pub fn from_config(source: &SourceConfig) -> ConfigResult<Self> {
        Ok(Self {
            title: parse_selector(&source.title_selector)?,
            content: parse_selector(&source.content_selector)?,
            next: parse_selector(&source.next_selector)?,
            noise: parse_selector(&source.noise_selector)?,
            link: parse_selector("a")?,
            navigation_link: compile_pattern(&source.navigation_link_pattern)?,
            source: source.clone(),
        })
    }

    /// Returns the chapter title with `#` replaced by `_`
    ///
    /// # Errors
    ///
    /// `BinderError::Structure` if the title element is missing or empty.
    pub fn title(&self, document: &Html, url: &Url) -> Result<String> {
        let title = document
            .select(&self.title)
            .next()
            .map(|element| element.text().collect::<String>())
            .map(|text| text.trim().replace('#', "_"))
            .filter(|text| !text.is_empty());

        title.ok_or_else(|| BinderError::Structure {
            url: url.to_string(),
            selector: self.source.title_selector.clone(),
        })
    }

    /// Returns the content container element
    pub fn content<'a>(&self, document: &'a Html, url: &Url) -> Result<ElementRef<'a>> {
        document
            .select(&self.content)
            .next()
            .ok_or_else(|| BinderError::Structure {
                url: url.to_string(),
                selector: self.source.content_selector.clone(),
            })
    }

    /// Returns the absolute URL of the next page, if the page links one
    pub fn next_link(&self, document: &Html, url: &Url) -> Result<Option<Url>> {
        let href = document
            .select(&self.next)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty());

        match href {
            Some(href) => Ok(Some(url.join(href)?)),
            None => Ok(None),
        }
    }

    /// Extracts the chapter from a fetched page
    ///
    /// The document is edited in place: navigation links and flair are
    /// detached from the tree. Images are fetched one at a time, in document
    /// order.
    pub async fn extract(
        &self,
        document: &mut Html,
        url: &Url,
        fetcher: &PageFetcher,
    ) -> Result<ExtractedChapter> {
        let title = self.title(document, url)?;

        let removed = self.remove_noise(document, url)?;
        if removed > 0 {
            tracing::debug!("Removed {} noise elements from '{}'", removed, title);
        }

        let sources = image_sources(self.content(document, url)?);

        let mut resources = Vec::with_capacity(sources.len());
        for source in &sources {
            let resource = self.localize_image(url, source, fetcher).await?;
            tracing::debug!("Localized {} as {}", source, resource.filename());
            resources.push(resource);
        }

        let filenames: Vec<String> = resources
            .iter()
            .map(|resource| resource.filename().to_string())
            .collect();
        let content = serialize_children(self.content(document, url)?, &filenames);

        Ok(ExtractedChapter {
            chapter: Chapter::new(title, content),
            resources,
        })
    }

    /// Detaches navigation links and flair from the content tree
    fn remove_noise(&self, document: &mut Html, url: &Url) -> Result<usize> {
        let doomed: Vec<_> = {
            let content = self.content(document, url)?;

            let navigation = content.select(&self.link).filter(|link| {
                let text = link.text().collect::<String>();
                self.navigation_link.is_match(text.trim())
            });
            let flair = content.select(&self.noise);

            navigation.chain(flair).map(|element| element.id()).collect()
        };

        for id in &doomed {
            if let Some(mut node) = document.tree.get_mut(*id) {
                node.detach();
            }
        }

        Ok(doomed.len())
    }

    async fn localize_image(&self, page: &Url, source: &str, fetcher: &PageFetcher) -> Result<Resource> {
        let image_url = page.join(source.trim())?;

        let mime_type = guess_mime_type(image_url.path()).ok_or_else(|| BinderError::MimeType {
            url: image_url.to_string(),
        })?;
        let content = fetcher.fetch_bytes(&image_url).await?;
        let extension = extension_of(image_url.path()).unwrap_or_default();

        Ok(Resource::new(content, mime_type, &extension))
    }
}
