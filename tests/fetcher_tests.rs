use roost::fetch::{FetchError, Fetcher, HttpFetcher};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>wire-title</title>
    <description>wire-desc</description>
    <item><guid>g1</guid><title>first</title><link>https://x.test/1</link></item>
    <item><guid>g2</guid><title>second</title></item>
</channel></rss>"#;

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(VALID_RSS)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/feed", mock_server.uri());
    let parsed = HttpFetcher::new().fetch(&url).await.unwrap();
    assert_eq!(parsed.title, "wire-title");
    assert_eq!(parsed.description.as_deref(), Some("wire-desc"));
    // RSS has no rel=self link; the requested URL wins
    assert_eq!(parsed.feed_url, url);
    assert_eq!(parsed.entries.len(), 2);
    assert_eq!(parsed.entries[0].url.as_deref(), Some("https://x.test/1"));
    assert_eq!(parsed.entries[1].url, None);
}

#[tokio::test]
async fn test_fetch_http_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = format!("{}/feed", mock_server.uri());
    let err = HttpFetcher::new().fetch(&url).await.unwrap_err();
    match err {
        FetchError::HttpStatus(404) => {}
        other => panic!("expected HttpStatus(404), got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_malformed_document() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/feed", mock_server.uri());
    let err = HttpFetcher::new().fetch(&url).await.unwrap_err();
    match err {
        FetchError::Parse(_) => {}
        other => panic!("expected Parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_connection_error() {
    // port 1 is essentially never listening
    let err = HttpFetcher::new()
        .fetch("http://127.0.0.1:1/feed")
        .await
        .unwrap_err();
    match err {
        FetchError::Network(_) => {}
        other => panic!("expected Network error, got {other:?}"),
    }
}
