use std::fmt;

/// A titled unit of cleaned chapter markup
///
/// The title doubles as the chapter's key in the table of contents, so it is
/// never empty. Content is an XHTML fragment with image sources already
/// pointing at resource filenames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    title: String,
    content: String,
}

/// Whether a rendered chapter page starts with its title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleBanner {
    Include,
    Suppress,
}

impl Chapter {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        debug_assert!(!title.is_empty(), "chapter title must not be empty");

        Self {
            title,
            content: content.into(),
        }
    }

    /// Builds the pseudo-chapter shown at the start of a section
    ///
    /// Its body is a fixed section page carrying the section name; it is
    /// meant to be rendered with [`TitleBanner::Suppress`].
    pub fn section_divider(name: &str) -> Self {
        Self::new(
            name,
            format!(r#"<div class="section">{}</div>"#, escape_markup(name)),
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Renders the page body, optionally prefixed by a title banner
    pub fn render(&self, banner: TitleBanner) -> String {
        match banner {
            TitleBanner::Include => format!(
                r#"<div class="title">{}</div>{}"#,
                escape_markup(&self.title),
                self.content
            ),
            TitleBanner::Suppress => self.content.clone(),
        }
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Escapes text for inclusion in XHTML element content or attributes
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
