//! EPUB 3 document sink
//!
//! Collects metadata, resources and chapter pages in memory and packages them
//! on [`DocumentSink::finalize`]:
//!
//! ```text
//! mimetype                  (stored, first entry)
//! META-INF/container.xml
//! OEBPS/content.opf
//! OEBPS/nav.xhtml           (EPUB 3 navigation document)
//! OEBPS/toc.ncx             (legacy table of contents)
//! OEBPS/style/ebook.css
//! OEBPS/page_0001.xhtml ...
//! OEBPS/images/<sha256>.<ext>
//! ```

use crate::model::{escape_markup, BookMetadata, Chapter, Resource, TitleBanner};
use crate::output::traits::{DocumentSink, OutputError, OutputResult};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Stylesheet used when none is configured
pub const DEFAULT_STYLESHEET: &str = r#"body {
  font-family: serif;
  line-height: 1.4;
  margin: 0 1em;
}

p {
  margin: 0;
  text-indent: 1.5em;
}

.title {
  font-size: 1.6em;
  font-weight: bold;
  text-align: center;
  margin: 2em 0 1.5em;
}

.section {
  font-size: 2em;
  font-weight: bold;
  text-align: center;
  margin-top: 40%;
}

img {
  max-width: 100%;
}
"#;

const STYLESHEET_HREF: &str = "style/ebook.css";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// One XHTML document in the reading order
#[derive(Debug, Clone)]
struct Page {
    id: String,
    href: String,
    title: String,
    body: String,
}

#[derive(Debug, Clone)]
struct TocEntry {
    title: String,
    href: String,
    children: Vec<TocEntry>,
}

/// Sink packaging a book as an EPUB 3 archive
#[derive(Debug, Clone)]
pub struct EpubSink {
    metadata: Option<BookMetadata>,
    stylesheet: Vec<u8>,
    resources: Vec<Resource>,
    resource_names: HashSet<String>,
    pages: Vec<Page>,
    toc: Vec<TocEntry>,
    chapter_titles: HashSet<String>,
}

impl EpubSink {
    pub fn new() -> Self {
        Self::with_stylesheet(DEFAULT_STYLESHEET.as_bytes().to_vec())
    }

    pub fn with_stylesheet(stylesheet: Vec<u8>) -> Self {
        Self {
            metadata: None,
            stylesheet,
            resources: Vec::new(),
            resource_names: HashSet::new(),
            pages: Vec::new(),
            toc: Vec::new(),
            chapter_titles: HashSet::new(),
        }
    }

    /// Number of XHTML pages in the reading order, section dividers included
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Writes the archive to any seekable destination
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> OutputResult<()> {
        let metadata = self
            .metadata
            .as_ref()
            .ok_or_else(|| OutputError::Write("book metadata was never set".to_string()))?;

        let mut zip = ZipWriter::new(writer);

        // The mimetype entry must come first and stay uncompressed
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML.as_bytes())?;

        let identifier = book_identifier(metadata);

        zip.start_file("OEBPS/content.opf", deflated)?;
        zip.write_all(self.generate_opf(metadata, &identifier).as_bytes())?;

        zip.start_file("OEBPS/nav.xhtml", deflated)?;
        zip.write_all(self.generate_nav(metadata).as_bytes())?;

        zip.start_file("OEBPS/toc.ncx", deflated)?;
        zip.write_all(self.generate_ncx(metadata, &identifier).as_bytes())?;

        zip.start_file(format!("OEBPS/{}", STYLESHEET_HREF), deflated)?;
        zip.write_all(&self.stylesheet)?;

        for page in &self.pages {
            zip.start_file(format!("OEBPS/{}", page.href), deflated)?;
            zip.write_all(xhtml_document(&metadata.language, &page.title, &page.body).as_bytes())?;
        }

        for resource in &self.resources {
            zip.start_file(format!("OEBPS/{}", resource.filename()), deflated)?;
            zip.write_all(resource.content())?;
        }

        zip.finish()?;
        Ok(())
    }

    fn add_page(&mut self, title: &str, body: String) -> String {
        let id = format!("page_{:04}", self.pages.len() + 1);
        let href = format!("{}.xhtml", id);

        self.pages.push(Page {
            id,
            href: href.clone(),
            title: title.to_string(),
            body,
        });
        href
    }

    fn add_chapter_page(&mut self, chapter: &Chapter) -> OutputResult<TocEntry> {
        if !self.chapter_titles.insert(chapter.title().to_string()) {
            return Err(OutputError::DuplicateChapter(chapter.title().to_string()));
        }

        let href = self.add_page(chapter.title(), chapter.render(TitleBanner::Include));
        Ok(TocEntry {
            title: chapter.title().to_string(),
            href,
            children: Vec::new(),
        })
    }

    fn generate_opf(&self, metadata: &BookMetadata, identifier: &str) -> String {
        let mut opf = String::new();

        opf.push_str(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
        );
        opf.push_str(&format!(
            "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
            escape_markup(identifier)
        ));
        opf.push_str(&format!(
            "    <dc:title>{}</dc:title>\n",
            escape_markup(&metadata.title)
        ));
        opf.push_str(&format!(
            "    <dc:language>{}</dc:language>\n",
            escape_markup(&metadata.language)
        ));
        if !metadata.author.is_empty() {
            opf.push_str(&format!(
                "    <dc:creator>{}</dc:creator>\n",
                escape_markup(&metadata.author)
            ));
        }
        opf.push_str(&format!(
            "    <meta property=\"dcterms:modified\">{}</meta>\n",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        ));

        opf.push_str("  </metadata>\n  <manifest>\n");
        opf.push_str(
            "    <item id=\"nav\" href=\"nav.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>\n",
        );
        opf.push_str(
            "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
        );
        opf.push_str(&format!(
            "    <item id=\"style\" href=\"{}\" media-type=\"text/css\"/>\n",
            STYLESHEET_HREF
        ));

        for page in &self.pages {
            opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
                page.id, page.href
            ));
        }

        for (index, resource) in self.resources.iter().enumerate() {
            opf.push_str(&format!(
                "    <item id=\"resource_{:04}\" href=\"{}\" media-type=\"{}\"/>\n",
                index + 1,
                escape_markup(resource.filename()),
                escape_markup(resource.mime_type())
            ));
        }

        opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");
        opf.push_str("    <itemref idref=\"nav\"/>\n");
        for page in &self.pages {
            opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", page.id));
        }
        opf.push_str("  </spine>\n</package>\n");

        opf
    }

    fn generate_nav(&self, metadata: &BookMetadata) -> String {
        let mut list = String::new();
        write_nav_list(&mut list, &self.toc, 3);

        let body = format!(
            "<nav epub:type=\"toc\" id=\"toc\">\n  <h1>Table of Contents</h1>\n{}</nav>",
            list
        );
        xhtml_document(&metadata.language, &metadata.title, &body)
    }

    fn generate_ncx(&self, metadata: &BookMetadata, identifier: &str) -> String {
        let depth = if self.toc.iter().any(|entry| !entry.children.is_empty()) {
            2
        } else {
            1
        };

        let mut ncx = String::new();
        ncx.push_str(&format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{}"/>
    <meta name="dtb:depth" content="{}"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>{}</text>
  </docTitle>
  <navMap>
"#,
            escape_markup(identifier),
            depth,
            escape_markup(&metadata.title)
        ));

        let mut play_order = 1;
        for entry in &self.toc {
            write_nav_point(&mut ncx, entry, &mut play_order, 2);
        }

        ncx.push_str("  </navMap>\n</ncx>\n");
        ncx
    }
}

impl Default for EpubSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSink for EpubSink {
    fn set_metadata(&mut self, metadata: &BookMetadata) -> OutputResult<()> {
        self.metadata = Some(metadata.clone());
        Ok(())
    }

    fn add_resource(&mut self, resource: &Resource) -> OutputResult<()> {
        if self.resource_names.insert(resource.filename().to_string()) {
            self.resources.push(resource.clone());
        }
        Ok(())
    }

    fn add_chapter(&mut self, chapter: &Chapter) -> OutputResult<()> {
        let entry = self.add_chapter_page(chapter)?;
        self.toc.push(entry);
        Ok(())
    }

    fn add_section(&mut self, name: &str, chapters: &[Chapter]) -> OutputResult<()> {
        if chapters.is_empty() {
            return Err(OutputError::Write(format!("section '{}' has no chapters", name)));
        }

        let divider = Chapter::section_divider(name);
        let href = self.add_page(name, divider.render(TitleBanner::Suppress));

        let children = chapters
            .iter()
            .map(|chapter| self.add_chapter_page(chapter))
            .collect::<OutputResult<Vec<_>>>()?;

        self.toc.push(TocEntry {
            title: name.to_string(),
            href,
            children,
        });
        Ok(())
    }

    fn finalize(&mut self, path: &Path) -> OutputResult<PathBuf> {
        let file = File::create(path)?;

        if let Err(e) = self.write_to(file) {
            // Never leave a truncated archive behind
            let _ = std::fs::remove_file(path);
            return Err(e);
        }

        Ok(path.to_path_buf())
    }
}

/// Deterministic identifier derived from title and author
fn book_identifier(metadata: &BookMetadata) -> String {
    let digest = Sha256::digest(format!("{}\n{}", metadata.title, metadata.author).as_bytes());
    format!("urn:serial-binder:{}", hex::encode(digest))
}

fn xhtml_document(language: &str, title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{lang}" xml:lang="{lang}">
<head>
  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="{css}"/>
</head>
<body>
{body}
</body>
</html>
"#,
        lang = escape_markup(language),
        title = escape_markup(title),
        css = STYLESHEET_HREF,
        body = body
    )
}

fn write_nav_list(out: &mut String, entries: &[TocEntry], indent: usize) {
    let indent_str = "  ".repeat(indent);

    out.push_str(&format!("{}<ol>\n", &indent_str[2..]));
    for entry in entries {
        out.push_str(&format!(
            "{}<li><a href=\"{}\">{}</a>",
            indent_str,
            escape_markup(&entry.href),
            escape_markup(&entry.title)
        ));
        if entry.children.is_empty() {
            out.push_str("</li>\n");
        } else {
            out.push('\n');
            write_nav_list(out, &entry.children, indent + 2);
            out.push_str(&format!("{}</li>\n", indent_str));
        }
    }
    out.push_str(&format!("{}</ol>\n", &indent_str[2..]));
}

fn write_nav_point(ncx: &mut String, entry: &TocEntry, play_order: &mut usize, indent: usize) {
    let indent_str = "  ".repeat(indent);

    ncx.push_str(&format!(
        "{}<navPoint id=\"navpoint-{}\" playOrder=\"{}\">\n",
        indent_str, play_order, play_order
    ));
    ncx.push_str(&format!(
        "{}  <navLabel>\n{}    <text>{}</text>\n{}  </navLabel>\n",
        indent_str,
        indent_str,
        escape_markup(&entry.title),
        indent_str
    ));
    ncx.push_str(&format!(
        "{}  <content src=\"{}\"/>\n",
        indent_str,
        escape_markup(&entry.href)
    ));

    *play_order += 1;

    for child in &entry.children {
        write_nav_point(ncx, child, play_order, indent + 1);
    }

    ncx.push_str(&format!("{}</navPoint>\n", indent_str));
}
