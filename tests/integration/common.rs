//! Shared fixtures for the integration tests

use serial_binder::config::Config;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders a chapter page in the blog layout the default selectors expect
pub fn chapter_page(title: &str, body: &str, next: Option<&str>) -> String {
    let next_link = next
        .map(|href| format!(r#"<a rel="next" href="{}">Next post</a>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><head><title>{title}</title></head><body>
        <h1 class="entry-title">{title}</h1>
        <div class="entry-content">{body}<div id="jp-post-flair"><p>Share this</p></div></div>
        <nav>{next_link}</nav>
        </body></html>"#,
        title = title,
        body = body,
        next_link = next_link
    )
}

/// Renders a table of contents listing the given chapter numbers
pub fn index_page(numbers: &[&str]) -> String {
    let items: String = numbers
        .iter()
        .map(|n| format!("<li><a href=\"/{}/\">{}</a></li>\n", n, n))
        .collect();

    format!(
        r#"<html><body><h1 class="entry-title">Table of Contents</h1>
        <div class="entry-content"><ul>{}</ul></div></body></html>"#,
        items
    )
}

pub async fn mount_html(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Mounts a linear chain of chapters at `/chapter-1/`, `/chapter-2/`, ...
///
/// Each entry is a title and a body; the last page has no next link.
pub async fn mount_chain(server: &MockServer, chapters: &[(&str, &str)]) {
    for (i, (title, body)) in chapters.iter().enumerate() {
        let next = if i + 1 < chapters.len() {
            Some(format!("/chapter-{}/", i + 2))
        } else {
            None
        };
        mount_html(
            server,
            &format!("/chapter-{}/", i + 1),
            chapter_page(title, body, next.as_deref()),
        )
        .await;
    }
}

/// Creates a test configuration pointing at the mock server
pub fn create_test_config(base_url: &str, output: &Path) -> Config {
    let mut config = Config::default();
    config.source.start_url = format!("{}/chapter-1/", base_url);
    config.source.index_url = format!("{}/table-of-contents/", base_url);
    config.crawler.request_delay_ms = 0;
    config.crawler.timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.contact_url = "https://example.com/contact".to_string();
    config.book.title = "Test Serial".to_string();
    config.book.author = "Test Author".to_string();
    config.book.output_path = output.to_path_buf();
    config
}
