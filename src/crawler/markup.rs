//! XHTML serialization of extracted chapter content
//!
//! Chapter bodies end up inside XHTML documents, so the children of the
//! content container are written back out with void elements self-closed and
//! text escaped for XML. Scripts and comments are dropped. `noscript` holds
//! its fallback markup as raw text; that text is parsed again and written in
//! place of the `noscript` element.
//!
//! Image sources are replaced while writing: the n-th `img` carrying a `src`
//! attribute receives the n-th replacement. [`image_sources`] walks the tree
//! in the same order, so the two always line up.

use scraper::{ElementRef, Html, Node};
use std::slice;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const DROPPED_ELEMENTS: &[&str] = &["script", "template"];

/// Serializes the children of `element`, substituting image sources in order
///
/// Images beyond the end of `image_sources` keep their original `src`.
pub fn serialize_children(element: ElementRef<'_>, image_sources: &[String]) -> String {
    let mut out = String::new();
    let mut sources = image_sources.iter();
    write_children(&mut out, element, &mut sources);
    out
}

/// Collects the `src` of every image below `element`, in serialization order
///
/// Images inside `noscript` fallbacks are included.
pub fn image_sources(element: ElementRef<'_>) -> Vec<String> {
    let mut sources = Vec::new();
    collect_sources(&mut sources, element);
    sources
}

fn collect_sources(sources: &mut Vec<String>, element: ElementRef<'_>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        let name = child.value().name();

        if DROPPED_ELEMENTS.contains(&name) {
            continue;
        }
        if name == "noscript" {
            let fallback = parse_noscript(child);
            collect_sources(sources, fallback.root_element());
            continue;
        }
        if name == "img" {
            if let Some(src) = child.value().attr("src") {
                sources.push(src.to_string());
            }
        }

        collect_sources(sources, child);
    }
}

/// Parses the raw text of a `noscript` element as markup
fn parse_noscript(element: ElementRef<'_>) -> Html {
    Html::parse_fragment(&element.text().collect::<String>())
}

fn write_children(out: &mut String, element: ElementRef<'_>, sources: &mut slice::Iter<'_, String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => escape_text(out, text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(out, child, sources);
                }
            }
            _ => {}
        }
    }
}

fn write_element(out: &mut String, element: ElementRef<'_>, sources: &mut slice::Iter<'_, String>) {
    let value = element.value();
    let name = value.name();

    if DROPPED_ELEMENTS.contains(&name) {
        return;
    }
    if name == "noscript" {
        let fallback = parse_noscript(element);
        write_children(out, fallback.root_element(), sources);
        return;
    }

    let replacement = if name == "img" && value.attr("src").is_some() {
        sources.next()
    } else {
        None
    };

    out.push('<');
    out.push_str(name);
    for (attr, original) in value.attrs() {
        let attr_value = match replacement {
            Some(source) if attr == "src" => source.as_str(),
            _ => original,
        };
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        escape_attribute(out, attr_value);
        out.push('"');
    }

    if VOID_ELEMENTS.contains(&name) {
        out.push_str(" />");
        return;
    }

    out.push('>');
    write_children(out, element, sources);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
