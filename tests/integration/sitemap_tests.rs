//! Sitemap crawling against mock servers

use crate::test_client;
use seo_lens::output::format_sitemap_report;
use seo_lens::sitemap::{analyze_sitemap, SitemapEntry, SitemapError};
use std::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

fn urlset(urls: &[&str]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<url><loc>{}</loc></url>", u))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

#[tokio::test]
async fn test_urlset_with_hreflang_alternates() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:xhtml="http://www.w3.org/1999/xhtml">
  <url>
    <loc>{base}/page</loc>
    <xhtml:link rel="alternate" hreflang="en" href="{base}/en/page"/>
    <xhtml:link rel="alternate" hreflang="fr" href="{base}/fr/page"/>
  </url>
</urlset>"#,
        base = base_url
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(body))
        .mount(&mock_server)
        .await;

    let seen = Mutex::new(Vec::new());
    let progress = |p: u8| seen.lock().unwrap().push(p);
    let report = analyze_sitemap(
        &test_client(),
        &format!("{}/sitemap.xml", base_url),
        &progress,
    )
    .await
    .expect("Sitemap analysis failed");

    let rows: Vec<_> = report.rows().collect();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.page_url == format!("{}/page", base_url)));
    assert_eq!(rows[0].hreflang_code.as_deref(), Some("en"));
    assert_eq!(rows[1].hreflang_url, Some(format!("{}/fr/page", base_url)));
    assert!(rows.iter().all(|r| r.source_sitemap == "main"));
    assert_eq!(report.summary(), "Summary:\n2 URLs processed");
    assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30, 100]);
}

#[tokio::test]
async fn test_index_with_failing_child() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let index = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{base}/pages.xml</loc></sitemap>
  <sitemap><loc>{base}/missing.xml</loc></sitemap>
  <sitemap><loc>{base}/posts.xml</loc></sitemap>
</sitemapindex>"#,
        base = base_url
    );
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(xml(index))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages.xml"))
        .respond_with(xml(urlset(&[
            &format!("{}/a", base_url),
            &format!("{}/b", base_url),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts.xml"))
        .respond_with(xml(urlset(&[&format!("{}/post-1", base_url)])))
        .mount(&mock_server)
        .await;

    let seen = Mutex::new(Vec::new());
    let progress = |p: u8| seen.lock().unwrap().push(p);
    let report = analyze_sitemap(
        &test_client(),
        &format!("{}/sitemap_index.xml", base_url),
        &progress,
    )
    .await
    .expect("Sitemap analysis failed");

    assert_eq!(report.url_rows, 3);
    assert_eq!(report.sitemaps_visited, Some(3));

    // Rows keep index order, the failure sits between the two good children
    assert!(matches!(&report.entries[0], SitemapEntry::Row(r) if r.source_sitemap == "pages.xml"));
    match &report.entries[2] {
        SitemapEntry::Error { context, message } => {
            assert_eq!(context, &format!("{}/missing.xml", base_url));
            assert!(message.contains("404"), "{}", message);
        }
        other => panic!("expected inline error, got {:?}", other),
    }
    assert!(matches!(&report.entries[3], SitemapEntry::Row(r) if r.source_sitemap == "posts.xml"));

    let progress = seen.lock().unwrap().clone();
    assert_eq!(progress, vec![10, 20, 30, 53, 76, 100]);

    let text = format_sitemap_report(&report);
    assert!(text.contains(&format!("Error processing {}/missing.xml", base_url)));
    assert!(text.ends_with("Summary:\n3 URLs processed\n3 sitemaps analyzed"));
}

#[tokio::test]
async fn test_non_xml_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&mock_server)
        .await;

    let result = analyze_sitemap(
        &test_client(),
        &format!("{}/sitemap.xml", mock_server.uri()),
        &seo_lens::NoProgress,
    )
    .await;

    match result {
        Err(SitemapError::Format { content_type, .. }) => {
            assert!(content_type.starts_with("text/html"))
        }
        other => panic!("expected format error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_xml() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml("<urlset><url><loc>x</loc></urlset>".to_string()))
        .mount(&mock_server)
        .await;

    let result = analyze_sitemap(
        &test_client(),
        &format!("{}/sitemap.xml", mock_server.uri()),
        &seo_lens::NoProgress,
    )
    .await;
    assert!(matches!(result, Err(SitemapError::Parse { .. })));
}

#[tokio::test]
async fn test_root_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = analyze_sitemap(
        &test_client(),
        &format!("{}/sitemap.xml", mock_server.uri()),
        &seo_lens::NoProgress,
    )
    .await;
    assert!(matches!(result, Err(SitemapError::Fetch(_))));
}

#[tokio::test]
async fn test_index_with_malformed_and_nested_children() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let index = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{base}/pages.xml</loc></sitemap>
  <sitemap><loc>{base}/broken.xml</loc></sitemap>
  <sitemap><loc>{base}/nested.xml</loc></sitemap>
  <sitemap><loc>{base}/posts.xml</loc></sitemap>
</sitemapindex>"#,
        base = base_url
    );
    let nested = format!(
        r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{}/deeper.xml</loc></sitemap>
</sitemapindex>"#,
        base_url
    );
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(xml(index))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages.xml"))
        .respond_with(xml(urlset(&[
            &format!("{}/a", base_url),
            &format!("{}/b", base_url),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.xml"))
        .respond_with(xml("<urlset><url>".to_string()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nested.xml"))
        .respond_with(xml(nested))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts.xml"))
        .respond_with(xml(urlset(&[&format!("{}/post-1", base_url)])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deeper.xml"))
        .respond_with(xml(urlset(&[&format!("{}/deep", base_url)])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let seen = Mutex::new(Vec::new());
    let progress = |p: u8| seen.lock().unwrap().push(p);
    let report = analyze_sitemap(
        &test_client(),
        &format!("{}/sitemap_index.xml", base_url),
        &progress,
    )
    .await
    .expect("Sitemap analysis failed");

    assert_eq!(report.url_rows, 3);
    assert_eq!(report.sitemaps_visited, Some(4));
    assert_eq!(report.entries.len(), 5);

    let pages: Vec<&str> = report.rows().map(|r| r.page_url.as_str()).collect();
    assert_eq!(
        pages,
        vec![
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/post-1", base_url),
        ]
    );

    match &report.entries[2] {
        SitemapEntry::Error { context, message } => {
            assert_eq!(context, &format!("{}/broken.xml", base_url));
            assert!(message.starts_with("XML parsing error"), "{}", message);
        }
        other => panic!("expected inline parse error, got {:?}", other),
    }
    match &report.entries[3] {
        SitemapEntry::Error { context, message } => {
            assert_eq!(context, &format!("{}/nested.xml", base_url));
            assert!(message.contains("nested sitemap index"), "{}", message);
        }
        other => panic!("expected inline nested-index note, got {:?}", other),
    }
    assert!(matches!(&report.entries[4], SitemapEntry::Row(r) if r.source_sitemap == "posts.xml"));

    assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30, 47, 65, 82, 100]);
}
