use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for Serial-Binder
///
/// Every section has defaults describing the bundled web serial, so an
/// empty file (or no file at all) yields a working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub book: BookConfig,
    pub arcs: ArcConfig,
}

/// Where the serial lives and how its pages are laid out
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// First chapter page of the chain
    pub start_url: String,

    /// Table-of-contents page used to estimate the chapter count
    pub index_url: String,

    /// Selector for the chapter title element
    pub title_selector: String,

    /// Selector for the chapter body container
    pub content_selector: String,

    /// Selector for the link to the following page
    pub next_selector: String,

    /// Selector for post metadata, sharing buttons and similar flair
    pub noise_selector: String,

    /// Regex matched against hyperlink text to spot chapter navigation links
    pub navigation_link_pattern: String,

    /// Regex whose matches on the index page are counted as chapters
    pub chapter_number_pattern: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            start_url: "https://parahumans.wordpress.com/2011/06/11/1-1/".to_string(),
            index_url: "https://parahumans.wordpress.com/table-of-contents/".to_string(),
            title_selector: ".entry-title".to_string(),
            content_selector: ".entry-content".to_string(),
            next_selector: r#"a[rel="next"]"#.to_string(),
            noise_selector: "#jp-post-flair, .sharedaddy, .jp-relatedposts".to_string(),
            navigation_link_pattern: r"(?i)^\s*(last|previous|next)\s+chapter\s*$".to_string(),
            chapter_number_pattern: r"(\d+|E)\.(\d+|\w)".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Pause between consecutive page fetches (milliseconds)
    pub request_delay_ms: u64,

    /// Fail when the chain ends before the index page's chapter count
    pub strict_chapter_count: bool,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 500,
            strict_chapter_count: false,
            timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SerialBinder".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/serial-binder/serial-binder".to_string(),
        }
    }
}

/// Output book configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BookConfig {
    pub title: String,
    pub author: String,
    pub language: String,

    /// Where the finished EPUB is written
    pub output_path: PathBuf,

    /// Optional stylesheet replacing the built-in one
    pub stylesheet: Option<PathBuf>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: "Worm".to_string(),
            author: "Wildbow".to_string(),
            language: "en".to_string(),
            output_path: PathBuf::from("worm.epub"),
            stylesheet: None,
        }
    }
}

/// Arc classification rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ArcConfig {
    /// Label of chapters that fold into the currently open arc
    pub interlude_label: String,

    /// Arc opened when an interlude arrives before any arc
    pub leading_interlude_arc: String,

    /// Exact chapter titles mapped straight to an arc label
    pub overrides: BTreeMap<String, String>,
}

/// Closing interlude title that breaks the numbering convention
pub const INTERLUDE_END_TITLE: &str = "Interlude: End";

impl ArcConfig {
    /// Configured overrides on top of the built-in ones
    ///
    /// `Interlude: End` maps to `interlude_label` unless the table says
    /// otherwise.
    pub fn effective_overrides(&self) -> BTreeMap<String, String> {
        let mut overrides = BTreeMap::new();
        overrides.insert(INTERLUDE_END_TITLE.to_string(), self.interlude_label.clone());
        overrides.extend(self.overrides.clone());
        overrides
    }
}

impl Default for ArcConfig {
    fn default() -> Self {
        Self {
            interlude_label: "Interlude".to_string(),
            leading_interlude_arc: "Introduction".to_string(),
            overrides: BTreeMap::new(),
        }
    }
}
