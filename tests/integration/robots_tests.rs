//! robots.txt retrieval and batch evaluation

use crate::test_client;
use seo_lens::robots::{check_urls, fetch_robots_txt, RobotsError, RobotsRuleSet};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROBOTS: &str = "User-agent: *\n\
Disallow: /admin/\n\
Allow: /admin/public\n\
\n\
User-agent: BadBot\n\
Disallow: /\n\
\n\
Sitemap: https://example.com/sitemap.xml\n";

#[tokio::test]
async fn test_fetch_and_check() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROBOTS))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = fetch_robots_txt(&test_client(), &format!("{}/robots.txt", base_url))
        .await
        .expect("Failed to fetch robots.txt");
    assert_eq!(body, ROBOTS);

    let rules = RobotsRuleSet::parse(&body).unwrap();
    assert_eq!(rules.sitemaps(), ["https://example.com/sitemap.xml"]);

    let urls = format!(
        "{base}/\n\n{base}/admin/settings\n  {base}/admin/public/help  \n",
        base = base_url
    );
    let verdicts = check_urls(&rules, urls.lines(), "Googlebot");
    let allowed: Vec<bool> = verdicts.iter().map(|v| v.allowed).collect();
    assert_eq!(allowed, vec![true, false, true]);
    assert_eq!(verdicts[2].url, format!("{}/admin/public/help", base_url));

    let bad = check_urls(&rules, urls.lines(), "BadBot/2.1");
    assert!(bad.iter().all(|v| !v.allowed));
}

#[tokio::test]
async fn test_fetch_missing_robots() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = fetch_robots_txt(
        &test_client(),
        &format!("{}/robots.txt", mock_server.uri()),
    )
    .await;
    match result {
        Err(RobotsError::Fetch(e)) => assert!(e.to_string().contains("404")),
        other => panic!("expected fetch error, got {:?}", other),
    }
}
