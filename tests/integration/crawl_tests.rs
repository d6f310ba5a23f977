//! Integration tests for the crawl sequencer and chapter extraction

use crate::common::{chapter_page, create_test_config, index_page, mount_chain, mount_html};
use scraper::Html;
use serial_binder::config::{Config, SourceConfig};
use serial_binder::crawler::{count_expected_chapters, ChapterExtractor, CrawlSequencer, PageFetcher};
use serial_binder::BinderError;
use std::path::Path;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    create_test_config(&server.uri(), Path::new("unused.epub"))
}

async fn mount_three_chapters(server: &MockServer) {
    mount_chain(
        server,
        &[
            ("Gestation 1.1", "<p>One</p>"),
            ("Gestation 1.2", "<p>Two</p>"),
            ("Gestation 1.3", "<p>Three</p>"),
        ],
    )
    .await;
}

#[tokio::test]
async fn test_sequencer_follows_chain_until_no_next_link() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/table-of-contents/", index_page(&["1.1", "1.2", "1.3"])).await;
    mount_three_chapters(&mock_server).await;

    let mut sequencer = CrawlSequencer::start(&config_for(&mock_server))
        .await
        .expect("sequencer should start");
    assert_eq!(sequencer.expected(), 3);

    let mut titles = Vec::new();
    while let Some(page) = sequencer.next_page().await.expect("crawl should succeed") {
        assert_eq!(page.arc(), "Gestation");
        assert!(!page.is_extracted());
        titles.push(page.title().to_string());
    }

    assert_eq!(titles, vec!["Gestation 1.1", "Gestation 1.2", "Gestation 1.3"]);
    assert_eq!(sequencer.yielded(), 3);

    // Exhausted sequencers stay exhausted
    assert!(sequencer.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn test_strict_mode_reports_short_chain() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/table-of-contents/",
        index_page(&["1.1", "1.2", "1.3", "1.4", "1.5"]),
    )
    .await;
    mount_three_chapters(&mock_server).await;

    let mut config = config_for(&mock_server);
    config.crawler.strict_chapter_count = true;
    let mut sequencer = CrawlSequencer::start(&config).await.unwrap();
    assert_eq!(sequencer.expected(), 5);

    for _ in 0..3 {
        assert!(sequencer.next_page().await.unwrap().is_some());
    }

    let result = sequencer.next_page().await;
    assert!(matches!(
        result,
        Err(BinderError::IncompleteCrawl {
            yielded: 3,
            expected: 5
        })
    ));
    assert!(sequencer.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn test_strict_mode_accepts_complete_chain() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/table-of-contents/", index_page(&["1.1", "1.2", "1.3"])).await;
    mount_three_chapters(&mock_server).await;

    let mut config = config_for(&mock_server);
    config.crawler.strict_chapter_count = true;
    let mut sequencer = CrawlSequencer::start(&config).await.unwrap();
    assert_eq!(sequencer.expected(), 3);

    for _ in 0..3 {
        assert!(sequencer.next_page().await.unwrap().is_some());
    }
    assert!(sequencer.next_page().await.unwrap().is_none());
    assert!(sequencer.next_page().await.unwrap().is_none());
    assert_eq!(sequencer.yielded(), 3);
}

#[tokio::test]
async fn test_lenient_mode_accepts_short_chain() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/table-of-contents/",
        index_page(&["1.1", "1.2", "1.3", "1.4", "1.5"]),
    )
    .await;
    mount_three_chapters(&mock_server).await;

    let mut sequencer = CrawlSequencer::start(&config_for(&mock_server)).await.unwrap();

    let mut count = 0;
    while sequencer.next_page().await.unwrap().is_some() {
        count += 1;
    }
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_missing_page_is_fetch_error() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/table-of-contents/", index_page(&["1.1", "1.2"])).await;
    mount_html(
        &mock_server,
        "/chapter-1/",
        chapter_page("Gestation 1.1", "<p>One</p>", Some("/chapter-2/")),
    )
    .await;

    let mut sequencer = CrawlSequencer::start(&config_for(&mock_server)).await.unwrap();
    assert!(sequencer.next_page().await.unwrap().is_some());

    let result = sequencer.next_page().await;
    assert!(matches!(result, Err(BinderError::Fetch { status: 404, .. })));

    // A failed crawl is over
    assert!(sequencer.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_index_fails_start() {
    let mock_server = MockServer::start().await;
    mount_three_chapters(&mock_server).await;

    let result = CrawlSequencer::start(&config_for(&mock_server)).await;
    assert!(matches!(result, Err(BinderError::Fetch { status: 404, .. })));
}

#[tokio::test]
async fn test_page_without_content_is_structure_error() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/table-of-contents/", index_page(&["1.1"])).await;
    mount_html(
        &mock_server,
        "/chapter-1/",
        r#"<html><body><h1 class="entry-title">Gestation 1.1</h1><p>Loose text</p></body></html>"#
            .to_string(),
    )
    .await;

    let mut sequencer = CrawlSequencer::start(&config_for(&mock_server)).await.unwrap();
    let result = sequencer.next_page().await;
    assert!(matches!(
        result,
        Err(BinderError::Structure { selector, .. }) if selector == ".entry-content"
    ));
}

#[tokio::test]
async fn test_unclassifiable_title_is_error() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/table-of-contents/", index_page(&["1.1"])).await;
    mount_chain(&mock_server, &[("Author's Note", "<p>Thanks for reading</p>")]).await;

    let mut sequencer = CrawlSequencer::start(&config_for(&mock_server)).await.unwrap();
    let result = sequencer.next_page().await;
    assert!(matches!(
        result,
        Err(BinderError::Classification { title }) if title == "Author's Note"
    ));
}

#[tokio::test]
async fn test_image_localized_once() {
    let mock_server = MockServer::start().await;
    let image_bytes = vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4];

    mount_html(&mock_server, "/table-of-contents/", index_page(&["1.1"])).await;
    mount_chain(
        &mock_server,
        &[(
            "Gestation 1.1",
            r#"<p>Map:</p><p><img src="/x/pic.PNG" alt="map"></p><p><a href="/chapter-0/">Last Chapter</a></p>"#,
        )],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/x/pic.PNG"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(image_bytes.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut sequencer = CrawlSequencer::start(&config_for(&mock_server)).await.unwrap();
    let mut page = sequencer.next_page().await.unwrap().expect("one page");

    let first = page
        .extract(sequencer.extractor(), sequencer.fetcher())
        .await
        .unwrap()
        .clone();
    assert!(page.is_extracted());

    // Second call reuses the stored result; the mock allows a single image fetch
    let second = page
        .extract(sequencer.extractor(), sequencer.fetcher())
        .await
        .unwrap()
        .clone();
    assert_eq!(first.chapter.content(), second.chapter.content());

    assert_eq!(first.resources.len(), 1);
    let resource = &first.resources[0];
    assert_eq!(resource.extension(), "png");
    assert_eq!(resource.mime_type(), "image/png");
    assert_eq!(resource.content(), image_bytes.as_slice());
    assert!(resource.filename().starts_with("images/"));

    let content = first.chapter.content();
    assert!(content.contains(&format!(r#"src="{}""#, resource.filename())));
    assert!(!content.contains("Last Chapter"));
    assert!(!content.contains("Share this"));
}

#[tokio::test]
async fn test_extraction_is_idempotent_across_parses() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/x/pic.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GIF89a".to_vec()))
        .mount(&mock_server)
        .await;

    let html = chapter_page(
        "Gestation 1.1",
        r#"<p>Before <em>the</em> image &amp; after</p><img src="/x/pic.gif"><p><a href="/chapter-2/">Next Chapter</a></p>"#,
        Some("/chapter-2/"),
    );
    let url = Url::parse(&format!("{}/chapter-1/", mock_server.uri())).unwrap();

    let extractor = ChapterExtractor::from_config(&SourceConfig::default()).unwrap();
    let fetcher = PageFetcher::new(reqwest::Client::new());

    let mut first_document = Html::parse_document(&html);
    let mut second_document = Html::parse_document(&html);
    let first = extractor
        .extract(&mut first_document, &url, &fetcher)
        .await
        .unwrap();
    let second = extractor
        .extract(&mut second_document, &url, &fetcher)
        .await
        .unwrap();

    assert_eq!(first.chapter.title(), second.chapter.title());
    assert_eq!(first.chapter.content(), second.chapter.content());
    assert_eq!(first.resources[0].filename(), second.resources[0].filename());
    assert!(first.chapter.content().contains("&amp; after"));
}

#[tokio::test]
async fn test_count_expected_chapters_on_index() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/table-of-contents/",
        index_page(&["1.1", "1.2", "1.x", "E.1", "E.2"]),
    )
    .await;

    let source = SourceConfig::default();
    let extractor = ChapterExtractor::from_config(&source).unwrap();
    let fetcher = PageFetcher::new(reqwest::Client::new());
    let pattern = regex::Regex::new(&source.chapter_number_pattern).unwrap();
    let index_url = Url::parse(&format!("{}/table-of-contents/", mock_server.uri())).unwrap();

    let count = count_expected_chapters(&fetcher, &extractor, &index_url, &pattern)
        .await
        .unwrap();
    assert_eq!(count, 5);
}
