//! Crawl sequencing - walking the chapter chain one page at a time
//!
//! The sequencer is a pull-based cursor over the serial. Each call to
//! [`CrawlSequencer::next_page`] fetches one page, checks that it still matches
//! the page template, classifies its title and remembers the "next" link.
//! The heavy part of extraction (noise removal, image downloads) is deferred
//! to [`RawPage::extract`], which runs at most once per page.
//!
//! The chain ends when a page has no next link. The chapter count found on the
//! index page is an estimate for progress reporting; only in strict mode does
//! falling short of it become an error.

use crate::arc::ArcClassifier;
use crate::config::{compile_pattern, Config};
use crate::crawler::{ChapterExtractor, ExtractedChapter, PageFetcher};
use crate::{BinderError, Result};
use regex::Regex;
use scraper::Html;
use std::time::Duration;
use url::Url;

/// A fetched chapter page whose extraction may not have happened yet
#[derive(Debug)]
pub struct RawPage {
    url: Url,
    title: String,
    arc: String,
    document: Html,
    extracted: Option<ExtractedChapter>,
}

impl RawPage {
    pub fn new(url: Url, title: String, arc: String, document: Html) -> Self {
        Self {
            url,
            title,
            arc,
            document,
            extracted: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Arc label derived from the title alone
    pub fn arc(&self) -> &str {
        &self.arc
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn is_extracted(&self) -> bool {
        self.extracted.is_some()
    }

    /// Extracts the chapter on first call and returns the memoized result
    /// afterwards, so images are only downloaded once
    pub async fn extract(
        &mut self,
        extractor: &ChapterExtractor,
        fetcher: &PageFetcher,
    ) -> Result<&ExtractedChapter> {
        let extracted = match self.extracted.take() {
            Some(extracted) => extracted,
            None => extractor.extract(&mut self.document, &self.url, fetcher).await?,
        };
        Ok(self.extracted.insert(extracted))
    }

    /// Consumes the page, extracting it first if needed
    pub async fn into_extracted(
        mut self,
        extractor: &ChapterExtractor,
        fetcher: &PageFetcher,
    ) -> Result<ExtractedChapter> {
        match self.extracted {
            Some(extracted) => Ok(extracted),
            None => extractor.extract(&mut self.document, &self.url, fetcher).await,
        }
    }
}

/// Fetches the index page and counts chapter numbers in its content
///
/// Every non-overlapping match of `pattern` in the content text counts as
/// one chapter.
pub async fn count_expected_chapters(
    fetcher: &PageFetcher,
    extractor: &ChapterExtractor,
    index_url: &Url,
    pattern: &Regex,
) -> Result<usize> {
    let document = fetcher.fetch(index_url).await?;
    let text = extractor
        .content(&document, index_url)?
        .text()
        .collect::<String>();

    Ok(pattern.find_iter(&text).count())
}

/// Pull-based cursor over the chapter chain
///
/// Not restartable: once it has returned `None` or an error, every further
/// call returns `None`.
pub struct CrawlSequencer {
    fetcher: PageFetcher,
    extractor: ChapterExtractor,
    classifier: ArcClassifier,
    cursor: Option<Url>,
    yielded: usize,
    expected: usize,
    strict: bool,
    request_delay: Duration,
    finished: bool,
}

impl CrawlSequencer {
    /// Creates a sequencer positioned at `start_url`
    pub fn new(
        fetcher: PageFetcher,
        extractor: ChapterExtractor,
        classifier: ArcClassifier,
        start_url: Url,
        expected: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            classifier,
            cursor: Some(start_url),
            yielded: 0,
            expected,
            strict: false,
            request_delay: Duration::ZERO,
            finished: false,
        }
    }

    /// Requires the chain to reach the expected chapter count
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Waits this long before every page fetch after the first
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Builds every collaborator from the configuration and counts the
    /// expected chapters on the index page
    pub async fn start(config: &Config) -> Result<Self> {
        crate::config::validate(config)?;

        let fetcher = PageFetcher::from_config(&config.user_agent, config.crawler.timeout_secs)?;
        let extractor = ChapterExtractor::from_config(&config.source)?;
        let classifier = ArcClassifier::from_config(&config.arcs)?;
        let pattern = compile_pattern(&config.source.chapter_number_pattern)?;

        let index_url = Url::parse(&config.source.index_url)?;
        let expected = count_expected_chapters(&fetcher, &extractor, &index_url, &pattern).await?;
        tracing::info!("Index page lists about {} chapters", expected);

        let start_url = Url::parse(&config.source.start_url)?;
        tracing::info!("Starting crawl at {}", start_url);

        Ok(Self::new(fetcher, extractor, classifier, start_url, expected)
            .strict(config.crawler.strict_chapter_count)
            .with_request_delay(Duration::from_millis(config.crawler.request_delay_ms)))
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    pub fn extractor(&self) -> &ChapterExtractor {
        &self.extractor
    }

    /// Chapter count estimated from the index page
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Number of pages yielded so far
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Fetches the next page of the chain
    ///
    /// # Returns
    ///
    /// * `Ok(Some(RawPage))` - The next chapter page
    /// * `Ok(None)` - The chain is exhausted
    /// * `Err(BinderError)` - The crawl failed and is over
    pub async fn next_page(&mut self) -> Result<Option<RawPage>> {
        if self.finished {
            return Ok(None);
        }

        let Some(url) = self.cursor.take() else {
            self.finished = true;

            if self.strict && self.yielded < self.expected {
                return Err(BinderError::IncompleteCrawl {
                    yielded: self.yielded,
                    expected: self.expected,
                });
            }

            tracing::info!("Crawl exhausted after {} chapters", self.yielded);
            return Ok(None);
        };

        match self.visit(url).await {
            Ok(page) => Ok(Some(page)),
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    async fn visit(&mut self, url: Url) -> Result<RawPage> {
        if self.yielded > 0 && !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let document = self.fetcher.fetch(&url).await?;

        let title = self.extractor.title(&document, &url)?;
        self.extractor.content(&document, &url)?;
        let arc = self.classifier.classify(&title)?;

        self.cursor = self.extractor.next_link(&document, &url)?;
        self.yielded += 1;

        if self.yielded == self.expected + 1 {
            tracing::warn!(
                "Crawl passed the {} chapters listed on the index page",
                self.expected
            );
        }

        Ok(RawPage::new(url, title, arc, document))
    }
}
