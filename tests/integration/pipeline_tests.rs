//! End-to-end tests: crawl, assemble and publish

use crate::common::{create_test_config, index_page, mount_chain, mount_html};
use serial_binder::{assemble_with, ArcAccumulator, BookAssembler, BookEntry, BookMetadata};
use serial_binder::{BinderError, CrawlSequencer};
use std::fs::File;
use std::io::Read;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::ZipArchive;

async fn mount_serial(server: &MockServer) {
    mount_html(
        server,
        "/table-of-contents/",
        index_page(&["1.1", "1.2", "1.x", "2.1", "2.2"]),
    )
    .await;

    mount_chain(
        server,
        &[
            ("Gestation 1.1", r#"<p>Brockton Bay.</p><p><img src="/media/map.png"></p>"#),
            ("Gestation 1.2", "<p>Locker.</p>"),
            ("Interlude 1", "<p>Elsewhere.</p>"),
            ("Insinuation 2.1", "<p>Costume.</p>"),
            ("Insinuation 2.2", r#"<p>Again <img src="/media/map.png"></p>"#),
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/media/map.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not really a png".to_vec()))
        .mount(server)
        .await;
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> String {
    let mut contents = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("archive should contain {}", name))
        .read_to_string(&mut contents)
        .unwrap();
    contents
}

#[tokio::test]
async fn test_assemble_groups_arcs() {
    let mock_server = MockServer::start().await;
    mount_serial(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("book.epub"));

    let mut sequencer = CrawlSequencer::start(&config).await.unwrap();
    let assembler = BookAssembler::new(
        BookMetadata::new("Test Serial", "Test Author"),
        ArcAccumulator::from_config(&config.arcs),
    );
    let book = assemble_with(&mut sequencer, assembler).await.unwrap();

    assert_eq!(book.chapter_count(), 5);
    // The same image on two pages is stored once
    assert_eq!(book.resources().len(), 1);

    let sections: Vec<(&str, usize)> = book
        .entries()
        .iter()
        .map(|entry| match entry {
            BookEntry::Section(section) => (section.name(), section.chapters().len()),
            BookEntry::Chapter(chapter) => panic!("unexpected loose chapter {}", chapter.title()),
        })
        .collect();
    assert_eq!(sections, vec![("Gestation", 3), ("Insinuation", 2)]);
}

#[tokio::test]
async fn test_run_writes_epub() {
    let mock_server = MockServer::start().await;
    mount_serial(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("book.epub");
    let config = create_test_config(&mock_server.uri(), &output);

    let written = serial_binder::run(config).await.expect("run should succeed");
    assert_eq!(written, output);

    let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
    assert_eq!(archive.by_index(0).unwrap().name(), "mimetype");

    // Two section dividers and five chapters
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert!(names.iter().any(|n| n == "OEBPS/page_0007.xhtml"));
    assert!(!names.iter().any(|n| n == "OEBPS/page_0008.xhtml"));
    assert_eq!(
        names.iter().filter(|n| n.starts_with("OEBPS/images/")).count(),
        1
    );

    let opf = read_entry(&mut archive, "OEBPS/content.opf");
    assert!(opf.contains("<dc:title>Test Serial</dc:title>"));
    assert!(opf.contains("<dc:creator>Test Author</dc:creator>"));

    let nav = read_entry(&mut archive, "OEBPS/nav.xhtml");
    let gestation = nav.find(">Gestation<").unwrap();
    let interlude = nav.find(">Interlude 1<").unwrap();
    let insinuation = nav.find(">Insinuation<").unwrap();
    assert!(gestation < interlude && interlude < insinuation);

    let first_chapter = read_entry(&mut archive, "OEBPS/page_0002.xhtml");
    assert!(first_chapter.contains(r#"<div class="title">Gestation 1.1</div>"#));
    assert!(first_chapter.contains(r#"src="images/"#));
    assert!(!first_chapter.contains("Share this"));
}

#[tokio::test]
async fn test_run_uses_configured_stylesheet() {
    let mock_server = MockServer::start().await;
    mount_serial(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let stylesheet = dir.path().join("custom.css");
    std::fs::write(&stylesheet, "body { color: teal; }").unwrap();

    let output = dir.path().join("book.epub");
    let mut config = create_test_config(&mock_server.uri(), &output);
    config.book.stylesheet = Some(stylesheet);

    serial_binder::run(config).await.unwrap();

    let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
    let css = read_entry(&mut archive, "OEBPS/style/ebook.css");
    assert_eq!(css, "body { color: teal; }");
}

#[tokio::test]
async fn test_failed_run_writes_nothing() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/table-of-contents/", index_page(&["1.1", "1.2"])).await;
    mount_chain(
        &mock_server,
        &[
            ("Gestation 1.1", "<p>One</p>"),
            ("Gestation 1.2", r#"<p><img src="/media/missing.jpg"></p>"#),
        ],
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("book.epub");
    let config = create_test_config(&mock_server.uri(), &output);

    let result = serial_binder::run(config).await;
    assert!(matches!(result, Err(BinderError::Fetch { status: 404, .. })));
    assert!(!output.exists());
}
